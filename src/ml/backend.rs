// ============================================================
// Layer 5: Backend Selection
// ============================================================
// CPU (ndarray) by default. Building with `--features wgpu`
// moves every tensor to the GPU through wgpu instead.
//
// Training needs the Autodiff wrapper for gradients; evaluation
// runs on the plain inner backend with no autodiff overhead.

#[cfg(not(feature = "wgpu"))]
pub type InnerBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type InnerBackend = burn::backend::Wgpu;

pub type TrainBackend = burn::backend::Autodiff<InnerBackend>;

pub type Device = <InnerBackend as burn::tensor::backend::Backend>::Device;

/// The default device of the compiled-in backend.
pub fn default_device() -> Device {
    Device::default()
}
