use crate::models::HealthRes;

/// Liveness check shared by every API surface.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    /// Static method to check health without creating an instance.
    ///
    /// # Returns
    /// A `HealthRes` indicating the service is healthy.
    pub fn check_health() -> HealthRes {
        HealthRes {
            status: "ok".into(),
            message: "MedBot is alive".into(),
        }
    }
}
