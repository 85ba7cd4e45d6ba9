//! # Business Config Repository

use std::sync::Arc;

use tracing::info;

use bizdesk_core::{BusinessConfig, ConfigRepository, CoreResult};

use crate::snapshot::SnapshotCell;

#[derive(Clone)]
pub struct BusinessConfigRepository {
    config: Arc<SnapshotCell<BusinessConfig>>,
}

impl BusinessConfigRepository {
    pub fn new(config: Arc<SnapshotCell<BusinessConfig>>) -> Self {
        BusinessConfigRepository { config }
    }
}

impl ConfigRepository for BusinessConfigRepository {
    fn business_config(&self) -> CoreResult<BusinessConfig> {
        self.config.snapshot()
    }

    fn save_business_config(&self, config: &BusinessConfig) -> CoreResult<()> {
        self.config.update(|c| {
            *c = config.clone();
            Ok(())
        })?;
        info!(tenant_id = %config.tenant_id, "Business config saved");
        Ok(())
    }
}
