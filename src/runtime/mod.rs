//! Runtime adapters: the tokio spawner and the job reconcile loop.

pub mod reconciler;
pub mod tokio_spawner;

pub use reconciler::JobReconciler;
pub use tokio_spawner::TokioSpawner;
