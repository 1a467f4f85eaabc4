//! The diffraction pipeline: elements in, scattering units out.

use std::sync::Arc;

use rayon::prelude::*;
use xrdsim_beam::{Beam, IntervalSet};
use xrdsim_polytope::IntersectOptions;

use crate::laue::diffraction_times;
use crate::{DiffractionEvent, DiffractionSettings, Result, Sample, SampleElement, ScatteringUnit};

/// Compute every scattering unit produced as `beam` sweeps through `sample`.
///
/// Elements are independent; with `settings.parallel` they are processed on
/// the rayon pool. The output is grouped by element index in ascending
/// order either way.
///
/// # Errors
///
/// Invalid settings, or a beam snapshot that cannot be built.
pub fn diffract(beam: &Beam, sample: &Sample, settings: &DiffractionSettings) -> Result<Vec<ScatteringUnit>> {
    settings.validate()?;
    let options = settings.intersect_options();
    let run = |(index, element): (usize, &SampleElement)| {
        diffract_element(beam, sample, settings, &options, index, element)
    };

    let per_element: Vec<Vec<ScatteringUnit>> = if settings.parallel {
        sample
            .elements()
            .par_iter()
            .enumerate()
            .map(run)
            .collect::<Result<_>>()?
    } else {
        sample
            .elements()
            .iter()
            .enumerate()
            .map(run)
            .collect::<Result<_>>()?
    };

    let units: Vec<ScatteringUnit> = per_element.into_iter().flatten().collect();
    log::debug!(
        "diffraction: {} elements produced {} scattering units",
        sample.elements().len(),
        units.len()
    );
    Ok(units)
}

fn diffract_element(
    beam: &Beam,
    sample: &Sample,
    settings: &DiffractionSettings,
    options: &IntersectOptions,
    element_index: usize,
    element: &SampleElement,
) -> Result<Vec<ScatteringUnit>> {
    let phase = sample.phase(element.phase())?;

    let windows = if settings.proximity_filter {
        beam.proximity_intervals(&element.bounding_sphere(), settings.bisection_max_iterations)
    } else {
        IntervalSet::full()
    };
    if windows.is_empty() {
        return Ok(Vec::new());
    }

    let rotation_axis = *beam.rotation_axis().as_ref();
    let mut units = Vec::new();
    for (hkl_index, hkl) in phase.miller_indices.iter().enumerate() {
        let g = element.reciprocal_vector(hkl);
        let (s1, s2) = diffraction_times(beam, &g);
        for time in [s1, s2].into_iter().flatten() {
            if !windows.contains(time) {
                continue;
            }
            let geometry = beam.geometry_at(time)?;
            let Some(region) = geometry.intersect_hull(element.hull(), options) else {
                continue;
            };
            let incident = *geometry.wavevector();
            let event = DiffractionEvent {
                time,
                incident,
                scattered: incident + g,
                wavelength: beam.wavelength(),
                rotation_axis,
                polarization: settings.polarization,
                hkl_index,
                element_index,
            };
            units.push(ScatteringUnit::new(
                region,
                event,
                Arc::clone(phase),
                settings.lorentz_tolerance_deg,
            ));
        }
    }

    log::trace!(
        "element {}: {} windows, {} scattering units",
        element_index,
        windows.len(),
        units.len()
    );
    Ok(units)
}
