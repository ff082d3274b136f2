#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FacingMode {
    /// Rear camera, preferred for pointing at a chart on another screen.
    Environment,
    User,
    Any,
}

/// Constraint set handed to the device when requesting a stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConstraints {
    pub facing: FacingMode,
    pub ideal_width: Option<u32>,
    pub ideal_height: Option<u32>,
}

impl StreamConstraints {
    /// First attempt for every acquisition: rear camera around full HD.
    pub fn preferred() -> Self {
        Self {
            facing: FacingMode::Environment,
            ideal_width: Some(1920),
            ideal_height: Some(1080),
        }
    }

    /// Bare "any camera" request used for the single relaxation retry.
    pub fn minimal() -> Self {
        Self {
            facing: FacingMode::Any,
            ideal_width: None,
            ideal_height: None,
        }
    }

    pub fn is_minimal(&self) -> bool {
        self.facing == FacingMode::Any && self.ideal_width.is_none() && self.ideal_height.is_none()
    }
}
