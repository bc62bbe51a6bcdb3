use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::render::BlitShader;

// 0 is the built-in identity pass.
static NEXT_PASS_ID: AtomicU64 = AtomicU64::new(1);

/// Stable handle of a compiled shader pass.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub struct ShaderPassId(u64);

impl ShaderPassId {
    pub const IDENTITY: ShaderPassId = ShaderPassId(0);

    #[inline]
    pub fn get(self) -> u64 {
        self.0
    }
}

/// One full-surface post-processing step.
///
/// `fragment` is WGSL defining `fs_main(in: VsOut) -> @location(0) vec4<f32>`.
/// It can sample `src_tex` with `src_sampler` at `in.uv` and read
/// `params.target` (width, height, time) and `params.tint`. Output is
/// premultiplied.
#[derive(Debug, Clone)]
pub struct ShaderPass {
    id: ShaderPassId,
    label: Arc<str>,
    fragment: Arc<str>,
}

impl ShaderPass {
    pub fn new(label: impl Into<Arc<str>>, fragment: impl Into<Arc<str>>) -> Self {
        Self {
            id: ShaderPassId(NEXT_PASS_ID.fetch_add(1, Ordering::Relaxed)),
            label: label.into(),
            fragment: fragment.into(),
        }
    }

    /// Pass-through pass; shares its pipeline with plain blits.
    pub fn identity() -> Self {
        let shader = BlitShader::IDENTITY;
        Self {
            id: ShaderPassId::IDENTITY,
            label: shader.label.into(),
            fragment: shader.fragment.into(),
        }
    }

    pub fn id(&self) -> ShaderPassId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub(crate) fn blit_shader(&self) -> BlitShader<'_> {
        BlitShader {
            key: self.id.get(),
            label: &self.label,
            fragment: &self.fragment,
        }
    }
}

/// Supplies the ordered, read-only list of passes applied to the primary surface.
///
/// Read once per present; the compositor never keeps the slice.
pub trait ShaderChainSource {
    fn active_chain(&self) -> &[ShaderPass];
}

impl ShaderChainSource for [ShaderPass] {
    fn active_chain(&self) -> &[ShaderPass] {
        self
    }
}

impl ShaderChainSource for Vec<ShaderPass> {
    fn active_chain(&self) -> &[ShaderPass] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_never_identity() {
        let a = ShaderPass::new("a", "x");
        let b = ShaderPass::new("b", "x");
        assert_ne!(a.id(), b.id());
        assert_ne!(a.id(), ShaderPassId::IDENTITY);
        assert_eq!(a.clone().id(), a.id());
    }

    #[test]
    fn identity_shares_blit_pipeline_key() {
        let id = ShaderPass::identity();
        assert_eq!(id.blit_shader().key, BlitShader::IDENTITY.key);
    }

    #[test]
    fn vec_is_a_chain_source() {
        let chain = vec![ShaderPass::identity(), ShaderPass::new("v", "x")];
        assert_eq!(chain.active_chain().len(), 2);
        assert_eq!(chain.active_chain()[1].label(), "v");
    }
}
