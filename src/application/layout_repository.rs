// Repository trait for the persisted dashboard layout
use crate::domain::widget::Layout;
use async_trait::async_trait;

#[async_trait]
pub trait LayoutRepository: Send + Sync {
    /// Read the persisted layout. `None` when nothing usable has been saved
    /// yet (missing or malformed document).
    async fn load(&self) -> anyhow::Result<Option<Layout>>;

    /// Replace the persisted layout wholesale.
    async fn save(&self, layout: &Layout) -> anyhow::Result<()>;
}
