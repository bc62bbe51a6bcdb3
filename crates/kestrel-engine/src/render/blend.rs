/// How a draw combines with what is already in the target.
///
/// Sources are premultiplied, so every factor below assumes premultiplied
/// color on both sides.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq, Hash)]
pub enum BlendMode {
    /// Premultiplied "over".
    #[default]
    Alpha,
    Additive,
    /// Multiplies the destination by the source color.
    Multiply,
    /// Overwrites the destination, alpha included.
    Replace,
}

impl BlendMode {
    /// wgpu blend state; `None` disables blending.
    pub fn to_wgpu(self) -> Option<wgpu::BlendState> {
        let component = |src_factor, dst_factor| wgpu::BlendComponent {
            src_factor,
            dst_factor,
            operation: wgpu::BlendOperation::Add,
        };

        use wgpu::BlendFactor as F;
        match self {
            BlendMode::Alpha => Some(wgpu::BlendState {
                color: component(F::One, F::OneMinusSrcAlpha),
                alpha: component(F::One, F::OneMinusSrcAlpha),
            }),
            BlendMode::Additive => Some(wgpu::BlendState {
                color: component(F::One, F::One),
                alpha: component(F::One, F::One),
            }),
            BlendMode::Multiply => Some(wgpu::BlendState {
                color: component(F::Dst, F::OneMinusSrcAlpha),
                alpha: component(F::DstAlpha, F::OneMinusSrcAlpha),
            }),
            BlendMode::Replace => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replace_disables_blending() {
        assert!(BlendMode::Replace.to_wgpu().is_none());
    }

    #[test]
    fn alpha_is_premultiplied_over() {
        let s = BlendMode::Alpha.to_wgpu().unwrap();
        assert_eq!(s.color.src_factor, wgpu::BlendFactor::One);
        assert_eq!(s.color.dst_factor, wgpu::BlendFactor::OneMinusSrcAlpha);
    }

    #[test]
    fn additive_keeps_destination() {
        let s = BlendMode::Additive.to_wgpu().unwrap();
        assert_eq!(s.color.dst_factor, wgpu::BlendFactor::One);
    }
}
