#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("task {0} is already registered")]
    AlreadyRegistered(String),
    /// Raised by OS-backed schedulers when the host refuses the task; the
    /// in-process interval scheduler never declines.
    #[error("scheduler declined registration: {0}")]
    Declined(String),
}
