//! Cube-mapped light probes
//!
//! A probe is a cube map plus one framebuffer per face. The shadow probe
//! stores depth as seen from the point light; the reflection probe stores
//! the garage as seen from the car.

use crate::render::device::{
    acquire_or_null, CubeFace, CubeMapFormat, CubeMapHandle, FramebufferHandle, GraphicsDevice,
};

/// Cube map render target with a framebuffer per face
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LightProbe {
    /// Color cube map, null for depth-only probes
    pub color: CubeMapHandle,
    /// Depth cube map
    pub depth: CubeMapHandle,
    /// Framebuffers in [`CubeFace::ALL`] order
    pub framebuffers: [FramebufferHandle; 6],
    /// Face size in texels
    pub resolution: u32,
}

impl LightProbe {
    /// Depth-only probe for point light shadows
    pub fn create_shadow_probe<D: GraphicsDevice>(device: &mut D, resolution: u32) -> Self {
        let depth = acquire_or_null("shadow depth cube map", device.create_cube_map(resolution, CubeMapFormat::Depth));
        Self::with_attachments(device, CubeMapHandle::NULL, depth, resolution)
    }

    /// Color and depth probe for environment reflections
    pub fn create_reflection_probe<D: GraphicsDevice>(device: &mut D, resolution: u32) -> Self {
        let color = acquire_or_null(
            "reflection color cube map",
            device.create_cube_map(resolution, CubeMapFormat::Color),
        );
        let depth = acquire_or_null(
            "reflection depth cube map",
            device.create_cube_map(resolution, CubeMapFormat::Depth),
        );
        Self::with_attachments(device, color, depth, resolution)
    }

    fn with_attachments<D: GraphicsDevice>(
        device: &mut D,
        color: CubeMapHandle,
        depth: CubeMapHandle,
        resolution: u32,
    ) -> Self {
        let framebuffers = CubeFace::ALL.map(|face| {
            if color.is_null() && depth.is_null() {
                FramebufferHandle::NULL
            } else {
                acquire_or_null("probe framebuffer", device.create_framebuffer(face, color, depth))
            }
        });
        log::debug!(
            "Created {}x{} probe (color {:?}, depth {:?})",
            resolution,
            resolution,
            color,
            depth
        );
        Self {
            color,
            depth,
            framebuffers,
            resolution,
        }
    }

    /// Framebuffer rendering into `face`
    pub fn framebuffer(&self, face: CubeFace) -> FramebufferHandle {
        self.framebuffers[face.index()]
    }

    /// Whether any face can be rendered
    pub fn is_usable(&self) -> bool {
        self.framebuffers.iter().any(|fb| !fb.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::backends::{HeadlessDevice, ResourceKind};

    #[test]
    fn test_shadow_probe_is_depth_only() {
        let mut device = HeadlessDevice::new();
        let probe = LightProbe::create_shadow_probe(&mut device, 512);

        assert!(probe.color.is_null());
        assert_eq!(device.cube_map_info(probe.depth), Some((Some(512), CubeMapFormat::Depth)));
        for face in CubeFace::ALL {
            let (attached_face, color, depth) = device.framebuffer_info(probe.framebuffer(face)).unwrap();
            assert_eq!(attached_face, face);
            assert!(color.is_null());
            assert_eq!(depth, probe.depth);
        }
    }

    #[test]
    fn test_reflection_probe_has_color() {
        let mut device = HeadlessDevice::new();
        let probe = LightProbe::create_reflection_probe(&mut device, 256);
        assert_eq!(device.cube_map_info(probe.color), Some((Some(256), CubeMapFormat::Color)));
        assert!(probe.is_usable());
    }

    #[test]
    fn test_failed_cube_map_gives_null_framebuffers() {
        let mut device = HeadlessDevice::new();
        device.fail_allocations(ResourceKind::CubeMap);
        let probe = LightProbe::create_shadow_probe(&mut device, 512);
        assert!(probe.depth.is_null());
        assert!(!probe.is_usable());
    }
}
