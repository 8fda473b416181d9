// Physical device selection
//
// Responsibilities:
// - Enumerate every GPU visible through the instance
// - Score each candidate with a fixed heuristic
// - Return the highest-scoring device, or a precise error

use std::ffi::CStr;

use ash::vk;
use thiserror::Error;

/// Flat score bonus for discrete GPUs.
const DISCRETE_GPU_BONUS: u32 = 1000;

/// Errors raised while choosing a physical device.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SelectionError {
    /// The host exposes no Vulkan-capable devices at all.
    #[error("failed to find GPUs with Vulkan support")]
    NoDevices,

    /// Devices exist, but every one of them is missing a required feature.
    #[error("failed to find a suitable GPU")]
    NoSuitableDevice,

    /// The driver rejected the enumeration call itself.
    #[error("failed to enumerate physical devices: {0}")]
    Enumeration(vk::Result),
}

/// Capability snapshot of one enumerated device. Plain data, so the scoring
/// policy can be exercised without a driver.
#[derive(Debug, Clone)]
struct DeviceCandidate {
    name: String,
    device_type: vk::PhysicalDeviceType,
    max_image_dimension_2d: u32,
    geometry_shader: bool,
    api_version: u32,
}

impl DeviceCandidate {
    fn from_queries(
        properties: &vk::PhysicalDeviceProperties,
        features: &vk::PhysicalDeviceFeatures,
    ) -> Self {
        Self {
            name: device_name(properties),
            device_type: properties.device_type,
            max_image_dimension_2d: properties.limits.max_image_dimension2_d,
            geometry_shader: features.geometry_shader == vk::TRUE,
            api_version: properties.api_version,
        }
    }
}

/// Rate a candidate. A score of 0 marks the device as unusable.
fn rate_device(candidate: &DeviceCandidate) -> u32 {
    // Geometry shader support is a hard requirement.
    if !candidate.geometry_shader {
        return 0;
    }

    let mut score = 0;
    if candidate.device_type == vk::PhysicalDeviceType::DISCRETE_GPU {
        score += DISCRETE_GPU_BONUS;
    }

    // Maximum 2D texture size stands in for overall capability.
    score += candidate.max_image_dimension_2d;
    score
}

/// Index of the best-scoring candidate. The first one seen wins a tie.
fn select_candidate(candidates: &[DeviceCandidate]) -> Result<usize, SelectionError> {
    if candidates.is_empty() {
        return Err(SelectionError::NoDevices);
    }

    let mut best_index = None;
    let mut best_score = 0;

    for (index, candidate) in candidates.iter().enumerate() {
        let score = rate_device(candidate);
        log::debug!(
            "Candidate {}: {} ({:?}), score {}",
            index,
            candidate.name,
            candidate.device_type,
            score
        );

        if score > best_score {
            best_score = score;
            best_index = Some(index);
        }
    }

    best_index.ok_or(SelectionError::NoSuitableDevice)
}

/// Enumerate the devices visible through `instance`, score them, and return
/// the winning handle.
pub fn pick_physical_device(
    instance: &ash::Instance,
) -> Result<vk::PhysicalDevice, SelectionError> {
    let devices = unsafe { instance.enumerate_physical_devices() }
        .map_err(SelectionError::Enumeration)?;
    log::debug!("Found {} physical device(s)", devices.len());

    let candidates: Vec<DeviceCandidate> = devices
        .iter()
        .map(|&device| {
            let properties = unsafe { instance.get_physical_device_properties(device) };
            let features = unsafe { instance.get_physical_device_features(device) };
            DeviceCandidate::from_queries(&properties, &features)
        })
        .collect();

    let winner = select_candidate(&candidates)?;
    let candidate = &candidates[winner];

    log::info!(
        "Selected GPU: {} ({:?}, score {})",
        candidate.name,
        candidate.device_type,
        rate_device(candidate)
    );
    log::info!(
        "API Version: {}.{}.{}",
        vk::api_version_major(candidate.api_version),
        vk::api_version_minor(candidate.api_version),
        vk::api_version_patch(candidate.api_version)
    );

    Ok(devices[winner])
}

/// Decode the fixed-size device name reported by the driver.
fn device_name(properties: &vk::PhysicalDeviceProperties) -> String {
    unsafe { CStr::from_ptr(properties.device_name.as_ptr()) }
        .to_string_lossy()
        .into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::raw::c_char;

    fn candidate(
        device_type: vk::PhysicalDeviceType,
        max_dimension: u32,
        geometry_shader: bool,
    ) -> DeviceCandidate {
        DeviceCandidate {
            name: "Test GPU".to_string(),
            device_type,
            max_image_dimension_2d: max_dimension,
            geometry_shader,
            api_version: vk::API_VERSION_1_0,
        }
    }

    #[test]
    fn discrete_gpu_gets_the_flat_bonus() {
        let discrete = candidate(vk::PhysicalDeviceType::DISCRETE_GPU, 4096, true);
        assert_eq!(rate_device(&discrete), 1000 + 4096);
    }

    #[test]
    fn integrated_gpu_scores_its_dimension_only() {
        let integrated = candidate(vk::PhysicalDeviceType::INTEGRATED_GPU, 2048, true);
        assert_eq!(rate_device(&integrated), 2048);
    }

    #[test]
    fn missing_geometry_shader_disqualifies_outright() {
        let big_discrete = candidate(vk::PhysicalDeviceType::DISCRETE_GPU, 16384, false);
        assert_eq!(rate_device(&big_discrete), 0);
    }

    #[test]
    fn discrete_beats_a_smaller_integrated_gpu() {
        let candidates = vec![
            candidate(vk::PhysicalDeviceType::INTEGRATED_GPU, 2048, true),
            candidate(vk::PhysicalDeviceType::DISCRETE_GPU, 4096, true),
        ];
        assert_eq!(select_candidate(&candidates), Ok(1));
    }

    #[test]
    fn a_large_enough_integrated_gpu_outscores_a_discrete_one() {
        // 8192 against 1000 + 4096; only the totals are compared.
        let candidates = vec![
            candidate(vk::PhysicalDeviceType::DISCRETE_GPU, 4096, true),
            candidate(vk::PhysicalDeviceType::INTEGRATED_GPU, 8192, true),
        ];
        assert_eq!(select_candidate(&candidates), Ok(1));
    }

    #[test]
    fn equal_scores_keep_the_first_candidate() {
        let candidates = vec![
            candidate(vk::PhysicalDeviceType::DISCRETE_GPU, 4096, true),
            candidate(vk::PhysicalDeviceType::DISCRETE_GPU, 4096, true),
        ];
        assert_eq!(select_candidate(&candidates), Ok(0));
    }

    #[test]
    fn empty_enumeration_reports_no_devices() {
        assert_eq!(select_candidate(&[]), Err(SelectionError::NoDevices));
    }

    #[test]
    fn all_disqualified_reports_no_suitable_device() {
        let candidates = vec![
            candidate(vk::PhysicalDeviceType::DISCRETE_GPU, 16384, false),
            candidate(vk::PhysicalDeviceType::INTEGRATED_GPU, 8192, false),
        ];
        assert_eq!(
            select_candidate(&candidates),
            Err(SelectionError::NoSuitableDevice)
        );
    }

    #[test]
    fn snapshot_reads_the_driver_structs() {
        let mut properties = vk::PhysicalDeviceProperties::default();
        properties.device_type = vk::PhysicalDeviceType::DISCRETE_GPU;
        properties.limits.max_image_dimension2_d = 4096;
        for (i, byte) in b"Test GPU\0".iter().enumerate() {
            properties.device_name[i] = *byte as c_char;
        }

        let mut features = vk::PhysicalDeviceFeatures::default();
        features.geometry_shader = vk::TRUE;

        let snapshot = DeviceCandidate::from_queries(&properties, &features);
        assert_eq!(snapshot.name, "Test GPU");
        assert_eq!(snapshot.device_type, vk::PhysicalDeviceType::DISCRETE_GPU);
        assert_eq!(snapshot.max_image_dimension_2d, 4096);
        assert!(snapshot.geometry_shader);
    }

    #[test]
    fn selection_errors_carry_the_classic_messages() {
        assert_eq!(
            SelectionError::NoDevices.to_string(),
            "failed to find GPUs with Vulkan support"
        );
        assert_eq!(
            SelectionError::NoSuitableDevice.to_string(),
            "failed to find a suitable GPU"
        );
    }
}
