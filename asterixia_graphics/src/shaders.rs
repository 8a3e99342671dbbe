pub const BODY_WGSL: &str = include_str!("shaders/body.wgsl");
pub const LINE_WGSL: &str = include_str!("shaders/line.wgsl");
pub const BACKGROUND_WGSL: &str = include_str!("shaders/background.wgsl");

#[inline]
pub fn create_shader_module(
    device: &wgpu::Device,
    label: &'static str,
    source: &'static str,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(source.into()),
    })
}
