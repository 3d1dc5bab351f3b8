/// Rendering error types
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("Surface creation failed: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),
    #[error("No suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),
    #[error("Device request failed: {0}")]
    Device(#[from] wgpu::RequestDeviceError),
    #[error("Surface reports no supported formats")]
    NoSurfaceFormat,
}

pub type RenderResult<T> = Result<T, RenderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bootstrap_errors_have_readable_messages() {
        assert_eq!(
            RenderError::NoSurfaceFormat.to_string(),
            "Surface reports no supported formats"
        );
    }
}
