use raw_window_handle::{HasDisplayHandle, HasWindowHandle};
use winit::dpi::PhysicalSize;

use crate::error::ShaderError;

/// Instance, device and swapchain for one window.
pub(crate) struct GpuContext {
    _instance: wgpu::Instance,
    pub surface: wgpu::Surface<'static>,
    pub device: wgpu::Device,
    pub queue: wgpu::Queue,
    pub config: wgpu::SurfaceConfiguration,
    pub surface_format: wgpu::TextureFormat,
}

impl GpuContext {
    /// The caller must keep `target` alive for as long as the context.
    pub(crate) fn new<T>(target: &T, initial_size: PhysicalSize<u32>) -> Result<Self, ShaderError>
    where
        T: HasDisplayHandle + HasWindowHandle,
    {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            flags: wgpu::InstanceFlags::default(),
            memory_budget_thresholds: wgpu::MemoryBudgetThresholds::default(),
            backend_options: wgpu::BackendOptions::default(),
        });

        let window_handle = target
            .window_handle()
            .map_err(|err| unavailable(format!("failed to acquire window handle: {err}")))?;
        let display_handle = target
            .display_handle()
            .map_err(|err| unavailable(format!("failed to acquire display handle: {err}")))?;

        let surface = unsafe {
            instance.create_surface_unsafe(wgpu::SurfaceTargetUnsafe::RawHandle {
                raw_display_handle: display_handle.as_raw(),
                raw_window_handle: window_handle.as_raw(),
            })
        }
        .map_err(|err| unavailable(format!("failed to create rendering surface: {err}")))?;

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::default(),
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .map_err(|err| unavailable(format!("no suitable GPU adapter: {err}")))?;

        let info = adapter.get_info();
        tracing::debug!(
            name = %info.name,
            backend = ?info.backend,
            device_type = ?info.device_type,
            "selected GPU adapter"
        );

        let (device, queue) = pollster::block_on(adapter.request_device(&wgpu::DeviceDescriptor {
            label: Some("canvas device"),
            required_features: wgpu::Features::empty(),
            required_limits: adapter.limits(),
            memory_hints: wgpu::MemoryHints::MemoryUsage,
            trace: wgpu::Trace::default(),
        }))
        .map_err(|err| unavailable(format!("failed to create GPU device: {err}")))?;

        let caps = surface.get_capabilities(&adapter);
        // Scene shaders apply their own gamma, so prefer a non-sRGB target.
        let surface_format = caps
            .formats
            .iter()
            .copied()
            .find(|format| !format.is_srgb())
            .or_else(|| caps.formats.first().copied())
            .ok_or_else(|| unavailable("surface reports no supported formats".to_string()))?;
        let present_mode = if caps.present_modes.contains(&wgpu::PresentMode::Fifo) {
            wgpu::PresentMode::Fifo
        } else {
            caps.present_modes
                .first()
                .copied()
                .unwrap_or(wgpu::PresentMode::AutoVsync)
        };
        tracing::debug!(?surface_format, ?present_mode, "configuring surface");

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: initial_size.width.max(1),
            height: initial_size.height.max(1),
            present_mode,
            alpha_mode: caps
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        Ok(Self {
            _instance: instance,
            surface,
            device,
            queue,
            config,
            surface_format,
        })
    }

    pub(crate) fn resize(&mut self, size: PhysicalSize<u32>) {
        if size.width == 0 || size.height == 0 {
            return;
        }
        if size.width == self.config.width && size.height == self.config.height {
            return;
        }
        self.config.width = size.width;
        self.config.height = size.height;
        self.reconfigure();
    }

    pub(crate) fn reconfigure(&self) {
        self.surface.configure(&self.device, &self.config);
    }
}

fn unavailable(message: String) -> ShaderError {
    ShaderError::ContextUnavailable(message)
}
