use state::{ConfigError, SpringConfig};

/// Simple 1D spring pulling a scalar back toward zero, used to let pitch/roll values swing out.
///
/// `mass` must be positive. `new` checks this, but the fields are public so anyone mutating
/// them directly is responsible for keeping it that way.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct SpringDamper1D {
    pub mass: f32,
    pub friction: f32,
    pub spring_constant: f32,

    /// distance of the attached object from the spring center
    pub position: f32,
    pub velocity: f32,
    /// accumulated force, decays with friction
    pub force: f32,
}

impl Default for SpringDamper1D {
    fn default() -> SpringDamper1D {
        let config = SpringConfig::default();
        SpringDamper1D {
            mass: config.mass,
            friction: config.friction,
            spring_constant: config.spring_constant,
            position: 0.0,
            velocity: 0.0,
            force: 0.0,
        }
    }
}

impl SpringDamper1D {
    pub fn new(
        mass: f32,
        friction: f32,
        spring_constant: f32,
        initial_position: f32,
    ) -> Result<SpringDamper1D, ConfigError> {
        let config = SpringConfig {
            mass,
            friction,
            spring_constant,
        };
        let mut spring = SpringDamper1D::from_config(&config)?;
        spring.position = initial_position;
        Ok(spring)
    }

    pub fn from_config(config: &SpringConfig) -> Result<SpringDamper1D, ConfigError> {
        config.validate()?;
        Ok(SpringDamper1D {
            mass: config.mass,
            friction: config.friction,
            spring_constant: config.spring_constant,
            ..SpringDamper1D::default()
        })
    }

    /// order matters here: force, then velocity, then position, then friction
    pub fn step(&mut self, dt: f32) {
        self.force += -self.position * self.spring_constant;
        self.velocity = self.force / self.mass;
        self.position += dt * self.velocity;
        self.force *= (1.0 - dt * self.friction).max(0.0);
    }

    /// external displacement, e.g. a bump. absorbed by the following steps
    pub fn change_position(&mut self, delta: f32) {
        self.position += delta;
    }

    pub fn reset(&mut self) {
        self.position = 0.0;
        self.velocity = 0.0;
        self.force = 0.0;
    }
}
