use crate::domain::model::Capability;
use crate::domain::ports::PermissionOracle;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use tokio::sync::mpsc;

/// `request_capabilities` 產生的待處理權限請求，由宿主回應
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionPrompt {
    pub id: u64,
    pub capabilities: Vec<Capability>,
}

/// 行程內的授權狀態，代替宿主的權限服務
///
/// 請求送入 channel 後不在此等待，宿主透過 [`GrantTable::resolve`] 回應
#[derive(Debug, Clone)]
pub struct GrantTable {
    granted: Arc<RwLock<HashSet<Capability>>>,
    prompts: mpsc::UnboundedSender<PermissionPrompt>,
    next_prompt_id: Arc<AtomicU64>,
}

impl GrantTable {
    pub fn new(initial: &[Capability]) -> (Self, mpsc::UnboundedReceiver<PermissionPrompt>) {
        let (prompts, receiver) = mpsc::unbounded_channel();
        let table = Self {
            granted: Arc::new(RwLock::new(initial.iter().copied().collect())),
            prompts,
            next_prompt_id: Arc::new(AtomicU64::new(1)),
        };
        (table, receiver)
    }

    pub fn grant(&self, capability: Capability) {
        self.write().insert(capability);
    }

    pub fn revoke(&self, capability: Capability) {
        self.write().remove(&capability);
    }

    /// 套用宿主的回應，未列在 `granted` 的權限會被撤銷
    pub fn resolve(&self, prompt: &PermissionPrompt, granted: &[Capability]) {
        let mut table = self.write();
        for capability in &prompt.capabilities {
            if granted.contains(capability) {
                table.insert(*capability);
            } else {
                table.remove(capability);
            }
        }
        let all_granted = prompt.capabilities.iter().all(|c| granted.contains(c));
        tracing::info!(prompt_id = prompt.id, "🔐 Permissions result: {}", all_granted);
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, HashSet<Capability>> {
        self.granted.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl PermissionOracle for GrantTable {
    fn has_capability(&self, capability: Capability) -> bool {
        self.granted
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&capability)
    }

    fn request_capabilities(&self, capabilities: &[Capability]) {
        let prompt = PermissionPrompt {
            id: self.next_prompt_id.fetch_add(1, Ordering::Relaxed),
            capabilities: capabilities.to_vec(),
        };
        tracing::debug!(prompt_id = prompt.id, "Requesting capabilities {:?}", capabilities);
        if self.prompts.send(prompt).is_err() {
            tracing::warn!("⚠️ No host is listening for permission prompts");
        }
    }
}
