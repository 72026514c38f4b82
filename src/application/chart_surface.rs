// Chart surface - Owns the live chart instance across re-renders
use crate::domain::chart::ChartConfig;

/// Something that can display a chart configuration.
pub trait ChartSurface: Send {
    type Instance: Send;

    fn create(&mut self, config: &ChartConfig) -> anyhow::Result<Self::Instance>;

    /// Release everything the instance holds.
    fn destroy(&mut self, instance: Self::Instance);

    fn reset_zoom(&mut self, instance: &mut Self::Instance);
}

/// Holds at most one live chart. Replacing it destroys the old instance
/// before the new one is created.
pub struct ChartSlot<S: ChartSurface> {
    surface: S,
    live: Option<S::Instance>,
}

impl<S: ChartSurface> ChartSlot<S> {
    pub fn new(surface: S) -> Self {
        Self { surface, live: None }
    }

    pub fn replace(&mut self, config: &ChartConfig) -> anyhow::Result<()> {
        if let Some(old) = self.live.take() {
            self.surface.destroy(old);
        }
        self.live = Some(self.surface.create(config)?);
        Ok(())
    }

    pub fn reset_zoom(&mut self) {
        if let Some(instance) = self.live.as_mut() {
            self.surface.reset_zoom(instance);
        }
    }

    pub fn live(&self) -> Option<&S::Instance> {
        self.live.as_ref()
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn clear(&mut self) {
        if let Some(old) = self.live.take() {
            self.surface.destroy(old);
        }
    }
}

impl<S: ChartSurface> Drop for ChartSlot<S> {
    fn drop(&mut self) {
        self.clear();
    }
}
