use std::collections::BTreeMap;
use std::sync::Mutex;

use chrono::Utc;

use super::audit::{AuditEvent, AuditRecord};
use super::domain::{Brief, BriefId, Framework, ResponseId, Supplier, SupplierCode};
use super::responses::BriefResponse;

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only lookup of procurement programs. Framework maintenance happens
/// outside the brief workflow.
pub trait FrameworkDirectory: Send + Sync {
    fn framework(&self, slug: &str) -> Result<Option<Framework>, StoreError>;
}

/// Read-only lookup of registered sellers.
pub trait SupplierDirectory: Send + Sync {
    fn supplier(&self, code: SupplierCode) -> Result<Option<Supplier>, StoreError>;
}

/// Brief persistence. Every write carries the audit record that must land
/// with it or not at all.
pub trait BriefRepository: Send + Sync {
    fn create_brief(&self, brief: Brief, audit: AuditRecord) -> Result<Brief, StoreError>;
    fn fetch_brief(&self, id: BriefId) -> Result<Option<Brief>, StoreError>;
    fn update_brief(&self, brief: Brief, audit: AuditRecord) -> Result<(), StoreError>;
}

/// Response persistence. `create_response` enforces the per-(brief, seller)
/// bound inside the store's own critical section, so two racing first-time
/// creates cannot both succeed.
pub trait ResponseRepository: Send + Sync {
    fn create_response(
        &self,
        response: BriefResponse,
        bound: u8,
        audit: AuditRecord,
    ) -> Result<BriefResponse, StoreError>;
    fn fetch_response(&self, id: ResponseId) -> Result<Option<BriefResponse>, StoreError>;
    fn update_response(&self, response: BriefResponse, audit: AuditRecord)
        -> Result<(), StoreError>;
    fn responses_for_brief(&self, brief_id: BriefId) -> Result<Vec<BriefResponse>, StoreError>;
    fn response_count(
        &self,
        brief_id: BriefId,
        supplier: SupplierCode,
    ) -> Result<u8, StoreError>;
}

/// Read access to the audit trail.
pub trait AuditLog: Send + Sync {
    fn events_for(&self, object_type: &str, object_id: u64) -> Result<Vec<AuditEvent>, StoreError>;
}

/// A store providing every persistence concern the brief service needs.
pub trait MarketplaceStore:
    BriefRepository + ResponseRepository + FrameworkDirectory + SupplierDirectory + AuditLog + 'static
{
}

impl<T> MarketplaceStore for T where
    T: BriefRepository
        + ResponseRepository
        + FrameworkDirectory
        + SupplierDirectory
        + AuditLog
        + 'static
{
}

#[derive(Default)]
struct Inner {
    frameworks: BTreeMap<String, Framework>,
    suppliers: BTreeMap<SupplierCode, Supplier>,
    briefs: BTreeMap<BriefId, Brief>,
    responses: BTreeMap<ResponseId, BriefResponse>,
    audits: Vec<AuditEvent>,
    next_brief_id: u64,
    next_response_id: u64,
    next_audit_id: u64,
}

impl Inner {
    fn record_audit(&mut self, audit: AuditRecord) {
        self.next_audit_id += 1;
        self.audits
            .push(audit.into_event(self.next_audit_id, Utc::now()));
    }
}

/// In-memory store backing the service and its tests. One mutex guards the
/// whole dataset; each write method is a single transaction.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_framework(&self, framework: Framework) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.frameworks.insert(framework.slug.clone(), framework);
        }
    }

    pub fn register_supplier(&self, supplier: Supplier) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.suppliers.insert(supplier.code, supplier);
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Unavailable("store mutex poisoned".to_string()))
    }
}

impl FrameworkDirectory for MemoryStore {
    fn framework(&self, slug: &str) -> Result<Option<Framework>, StoreError> {
        Ok(self.lock()?.frameworks.get(slug).cloned())
    }
}

impl SupplierDirectory for MemoryStore {
    fn supplier(&self, code: SupplierCode) -> Result<Option<Supplier>, StoreError> {
        Ok(self.lock()?.suppliers.get(&code).cloned())
    }
}

impl BriefRepository for MemoryStore {
    fn create_brief(&self, mut brief: Brief, audit: AuditRecord) -> Result<Brief, StoreError> {
        let mut inner = self.lock()?;
        inner.next_brief_id += 1;
        brief.id = BriefId(inner.next_brief_id);

        let mut audit = audit;
        audit.object_id = brief.id.0;
        inner.briefs.insert(brief.id, brief.clone());
        inner.record_audit(audit);
        Ok(brief)
    }

    fn fetch_brief(&self, id: BriefId) -> Result<Option<Brief>, StoreError> {
        Ok(self.lock()?.briefs.get(&id).cloned())
    }

    fn update_brief(&self, brief: Brief, audit: AuditRecord) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.briefs.contains_key(&brief.id) {
            return Err(StoreError::NotFound);
        }
        inner.briefs.insert(brief.id, brief);
        inner.record_audit(audit);
        Ok(())
    }
}

impl ResponseRepository for MemoryStore {
    fn create_response(
        &self,
        mut response: BriefResponse,
        bound: u8,
        audit: AuditRecord,
    ) -> Result<BriefResponse, StoreError> {
        let mut inner = self.lock()?;

        // Bound check and insert happen under the same lock: the uniqueness
        // guarantee the relational schema would provide with a constraint.
        let existing = inner
            .responses
            .values()
            .filter(|existing| {
                existing.brief_id == response.brief_id
                    && existing.supplier_code == response.supplier_code
            })
            .count();
        if existing >= bound as usize {
            return Err(StoreError::Conflict);
        }

        inner.next_response_id += 1;
        response.id = ResponseId(inner.next_response_id);

        let mut audit = audit;
        audit.object_id = response.id.0;
        inner.responses.insert(response.id, response.clone());
        inner.record_audit(audit);
        Ok(response)
    }

    fn fetch_response(&self, id: ResponseId) -> Result<Option<BriefResponse>, StoreError> {
        Ok(self.lock()?.responses.get(&id).cloned())
    }

    fn update_response(
        &self,
        response: BriefResponse,
        audit: AuditRecord,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        if !inner.responses.contains_key(&response.id) {
            return Err(StoreError::NotFound);
        }
        inner.responses.insert(response.id, response);
        inner.record_audit(audit);
        Ok(())
    }

    fn responses_for_brief(&self, brief_id: BriefId) -> Result<Vec<BriefResponse>, StoreError> {
        Ok(self
            .lock()?
            .responses
            .values()
            .filter(|response| response.brief_id == brief_id)
            .cloned()
            .collect())
    }

    fn response_count(
        &self,
        brief_id: BriefId,
        supplier: SupplierCode,
    ) -> Result<u8, StoreError> {
        let count = self
            .lock()?
            .responses
            .values()
            .filter(|response| {
                response.brief_id == brief_id && response.supplier_code == supplier
            })
            .count();
        Ok(count.min(u8::MAX as usize) as u8)
    }
}

impl AuditLog for MemoryStore {
    fn events_for(&self, object_type: &str, object_id: u64) -> Result<Vec<AuditEvent>, StoreError> {
        Ok(self
            .lock()?
            .audits
            .iter()
            .filter(|event| event.object_type == object_type && event.object_id == object_id)
            .cloned()
            .collect())
    }
}
