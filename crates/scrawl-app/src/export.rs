//! PNG export: offscreen render, GPU readback, encoding and platform hand-off.

use peniko::Color;
use scrawl_render::{PngRenderResult, RenderResult, RendererError};
use vello::wgpu;
use vello::{AaConfig, RenderParams, Scene};

/// Bytes per row of the readback buffer, padded to the wgpu copy alignment.
fn padded_bytes_per_row(width: u32) -> u32 {
    (width * 4).next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT)
}

/// Remove the per-row alignment padding from a readback buffer.
fn strip_row_padding(data: &[u8], width: u32, height: u32, bytes_per_row: u32) -> Vec<u8> {
    let row_len = (width * 4) as usize;
    let mut rgba_data = Vec::with_capacity(row_len * height as usize);
    for row in 0..height {
        let row_start = (row * bytes_per_row) as usize;
        rgba_data.extend_from_slice(&data[row_start..row_start + row_len]);
    }
    rgba_data
}

/// Render `scene` into a fresh texture and queue a copy into a mappable buffer.
///
/// Returns the readback buffer and its row pitch.
fn render_to_readback(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    vello_renderer: &mut vello::Renderer,
    scene: &Scene,
    width: u32,
    height: u32,
) -> RenderResult<(wgpu::Buffer, u32)> {
    let extent = wgpu::Extent3d {
        width,
        height,
        depth_or_array_layers: 1,
    };
    let texture = device.create_texture(&wgpu::TextureDescriptor {
        label: Some("png export texture"),
        size: extent,
        mip_level_count: 1,
        sample_count: 1,
        dimension: wgpu::TextureDimension::D2,
        format: wgpu::TextureFormat::Rgba8Unorm,
        usage: wgpu::TextureUsages::STORAGE_BINDING
            | wgpu::TextureUsages::COPY_SRC
            | wgpu::TextureUsages::TEXTURE_BINDING,
        view_formats: &[],
    });
    let texture_view = texture.create_view(&wgpu::TextureViewDescriptor::default());

    let params = RenderParams {
        base_color: Color::WHITE,
        width,
        height,
        antialiasing_method: AaConfig::Area,
    };
    vello_renderer
        .render_to_texture(device, queue, scene, &texture_view, &params)
        .map_err(|e| RendererError::RenderFailed(format!("{e:?}")))?;

    let bytes_per_row = padded_bytes_per_row(width);
    let readback_buffer = device.create_buffer(&wgpu::BufferDescriptor {
        label: Some("png readback buffer"),
        size: u64::from(bytes_per_row) * u64::from(height),
        usage: wgpu::BufferUsages::COPY_DST | wgpu::BufferUsages::MAP_READ,
        mapped_at_creation: false,
    });

    let mut encoder = device.create_command_encoder(&wgpu::CommandEncoderDescriptor {
        label: Some("png copy encoder"),
    });
    encoder.copy_texture_to_buffer(
        wgpu::TexelCopyTextureInfo {
            texture: &texture,
            mip_level: 0,
            origin: wgpu::Origin3d::ZERO,
            aspect: wgpu::TextureAspect::All,
        },
        wgpu::TexelCopyBufferInfo {
            buffer: &readback_buffer,
            layout: wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(bytes_per_row),
                rows_per_image: Some(height),
            },
        },
        extent,
    );
    queue.submit(std::iter::once(encoder.finish()));

    Ok((readback_buffer, bytes_per_row))
}

/// Render a Vello scene to RGBA pixels (native version - blocking).
#[cfg(not(target_arch = "wasm32"))]
pub fn render_scene_to_png(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    vello_renderer: &mut vello::Renderer,
    scene: &Scene,
    width: u32,
    height: u32,
) -> RenderResult<PngRenderResult> {
    if width == 0 || height == 0 {
        return Err(RendererError::Export("empty export area".to_string()));
    }

    let (readback_buffer, bytes_per_row) =
        render_to_readback(device, queue, vello_renderer, scene, width, height)?;

    let buffer_slice = readback_buffer.slice(..);
    let (tx, rx) = std::sync::mpsc::channel();
    buffer_slice.map_async(wgpu::MapMode::Read, move |result| {
        tx.send(result).ok();
    });

    // Blocks until the GPU is done
    let _ = device.poll(wgpu::PollType::wait_indefinitely());

    match rx.recv() {
        Ok(Ok(())) => {}
        Ok(Err(e)) => return Err(RendererError::Export(format!("buffer mapping failed: {e:?}"))),
        Err(_) => return Err(RendererError::Export("buffer mapping never completed".to_string())),
    }

    let data = buffer_slice.get_mapped_range();
    let rgba_data = strip_row_padding(&data, width, height, bytes_per_row);
    drop(data);
    readback_buffer.unmap();

    Ok(PngRenderResult {
        rgba_data,
        width,
        height,
    })
}

/// Async PNG export for WASM - renders the scene and triggers a download when complete.
#[cfg(target_arch = "wasm32")]
pub fn spawn_png_export_async(
    device: &wgpu::Device,
    queue: &wgpu::Queue,
    scene: Scene,
    width: u32,
    height: u32,
    filename: String,
) {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use wasm_bindgen::JsCast;
    use wasm_bindgen::JsValue;

    if width == 0 || height == 0 {
        log::warn!("Cannot export empty scene");
        return;
    }

    log::info!("Starting async PNG export: {}x{}", width, height);

    let mut vello_renderer = match vello::Renderer::new(device, vello::RendererOptions::default()) {
        Ok(r) => r,
        Err(e) => {
            log::error!("Failed to create Vello renderer for export: {:?}", e);
            return;
        }
    };

    let (readback_buffer, bytes_per_row) =
        match render_to_readback(device, queue, &mut vello_renderer, &scene, width, height) {
            Ok(target) => target,
            Err(e) => {
                log::error!("PNG export failed: {}", e);
                return;
            }
        };

    let mapped = Arc::new(AtomicBool::new(false));
    let mapped_clone = mapped.clone();
    readback_buffer
        .slice(..)
        .map_async(wgpu::MapMode::Read, move |result| {
            if result.is_ok() {
                mapped_clone.store(true, Ordering::SeqCst);
            } else {
                log::error!("Buffer mapping failed: {:?}", result);
            }
        });

    wasm_bindgen_futures::spawn_local(async move {
        // ~10 seconds at 60fps
        const MAX_ATTEMPTS: u32 = 600;
        let mut attempts = 0u32;

        while !mapped.load(Ordering::SeqCst) {
            attempts += 1;
            if attempts >= MAX_ATTEMPTS {
                log::error!("Timeout waiting for buffer mapping after {} frames", attempts);
                return;
            }

            // WebGPU callbacks only run once the browser gets a task turn, a
            // resolved promise is not enough.
            let promise = js_sys::Promise::new(&mut |resolve, _reject| {
                let Some(window) = web_sys::window() else {
                    return;
                };
                let closure = wasm_bindgen::closure::Closure::once_into_js(move || {
                    let _ = resolve.call0(&JsValue::NULL);
                });
                let _ = window.request_animation_frame(closure.unchecked_ref());
            });
            let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
        }

        let buffer_slice = readback_buffer.slice(..);
        let data = buffer_slice.get_mapped_range();
        let rgba_data = strip_row_padding(&data, width, height, bytes_per_row);
        drop(data);
        readback_buffer.unmap();

        match encode_png(&rgba_data, width, height) {
            Ok(png_data) => deliver_png(&png_data, &filename),
            Err(e) => log::error!("Failed to encode PNG: {}", e),
        }
    });
}

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> RenderResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder
            .write_header()
            .map_err(|e| RendererError::Export(format!("PNG header: {e}")))?;
        writer
            .write_image_data(rgba_data)
            .map_err(|e| RendererError::Export(format!("PNG data: {e}")))?;
    }
    Ok(png_data)
}

/// Offer the encoded image to the user through a native save dialog.
#[cfg(all(not(target_arch = "wasm32"), feature = "native"))]
pub fn deliver_png(png_data: &[u8], filename: &str) {
    let dialog = rfd::FileDialog::new()
        .set_title("Export PNG")
        .set_file_name(filename)
        .add_filter("PNG Image", &["png"]);

    if let Some(path) = dialog.save_file() {
        if let Err(e) = std::fs::write(&path, png_data) {
            log::error!("Failed to write PNG: {}", e);
        } else {
            log::info!("Exported PNG to: {:?} ({} bytes)", path, png_data.len());
        }
    }
}

/// Without a dialog backend the image lands in the working directory.
#[cfg(all(not(target_arch = "wasm32"), not(feature = "native")))]
pub fn deliver_png(png_data: &[u8], filename: &str) {
    match std::fs::write(filename, png_data) {
        Ok(()) => log::info!("Exported PNG to: {} ({} bytes)", filename, png_data.len()),
        Err(e) => log::error!("Failed to write PNG: {}", e),
    }
}

/// Trigger a browser download of the encoded image.
#[cfg(target_arch = "wasm32")]
pub fn deliver_png(png_data: &[u8], filename: &str) {
    match crate::web::download_binary_file(filename, png_data, "image/png") {
        Ok(()) => log::info!("PNG export complete: {} bytes", png_data.len()),
        Err(e) => log::error!("Failed to download PNG: {:?}", e),
    }
}
