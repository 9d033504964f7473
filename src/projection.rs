use std::f64::consts::FRAC_PI_2;

/// Maps plot coordinates onto the screen plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    /// Drop `z`.
    Flat,
    /// Orthographic view of a `z`-up scene, rotated by `yaw` around `z` and
    /// tilted towards the viewer by `pitch` (radians).
    Orbit { yaw: f64, pitch: f64 },
}

impl Projection {
    pub const DEFAULT_YAW: f64 = 0.6;
    pub const DEFAULT_PITCH: f64 = 0.45;
    pub const DEFAULT_ORBIT: Self = Self::Orbit {
        yaw: Self::DEFAULT_YAW,
        pitch: Self::DEFAULT_PITCH,
    };

    pub fn project(self, [x, y, z]: [f64; 3]) -> (f64, f64) {
        match self {
            Self::Flat => (x, y),
            Self::Orbit { yaw, pitch } => {
                let (sin_yaw, cos_yaw) = yaw.sin_cos();
                let (sin_pitch, cos_pitch) = pitch.sin_cos();
                let horizontal = x * cos_yaw - y * sin_yaw;
                let depth = x * sin_yaw + y * cos_yaw;
                (horizontal, z * cos_pitch - depth * sin_pitch)
            }
        }
    }

    pub fn rotate(self, yaw_delta: f64, pitch_delta: f64) -> Self {
        match self {
            Self::Flat => Self::Flat,
            Self::Orbit { yaw, pitch } => Self::Orbit {
                yaw: yaw + yaw_delta,
                pitch: (pitch + pitch_delta).clamp(-FRAC_PI_2, FRAC_PI_2),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flat_drops_z() {
        assert_eq!(Projection::Flat.project([1., 2., 3.]), (1., 2.));
        assert_eq!(Projection::Flat.rotate(1., 1.), Projection::Flat);
    }

    #[test]
    fn orbit_without_rotation_looks_along_y() {
        let front = Projection::Orbit {
            yaw: 0.,
            pitch: 0.,
        };
        assert_eq!(front.project([1., 5., 2.]), (1., 2.));
    }

    #[test]
    fn pitch_is_clamped() {
        let Projection::Orbit { pitch, .. } = Projection::DEFAULT_ORBIT.rotate(0., 10.) else {
            panic!("orbit expected");
        };
        assert_eq!(pitch, FRAC_PI_2);
    }
}
