use crate::surface::SurfaceError;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("notification permission not granted")]
    PermissionMissing,
    #[error(transparent)]
    Surface(#[from] SurfaceError),
}
