//! In-memory entity store with per-entity locking.
//!
//! All mutating operations on a given series, party, register or product
//! are serialized through that entity's own mutex. Cross-entity operations
//! acquire every needed lock before mutating any of them, in the fixed
//! global order **document → series → party → cash register → products
//! sorted by id**; blocking acquisition in a total order cannot deadlock.
//!
//! Lock handles are cloned `Arc`s so no `DashMap` shard guard is ever held
//! while waiting on an entity mutex. A poisoned mutex (a writer panicked
//! mid-operation) surfaces as `ConcurrentModification`, which is safe to
//! retry from scratch.

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;

use gestra_shared::types::{CashRegisterId, DocumentId, PartyId, ProductId, SeriesId};

use crate::document::Document;
use crate::error::FiscalError;
use crate::ledger::types::{CashRegister, PartyLedger, Product, StockMovement};
use crate::series::DocumentSeries;

/// Locks an entity handle, mapping poisoning to `ConcurrentModification`.
pub fn lock_entity<T>(handle: &Arc<Mutex<T>>) -> Result<MutexGuard<'_, T>, FiscalError> {
    handle.lock().map_err(|_| FiscalError::ConcurrentModification)
}

/// The in-memory entity collections owned by the engine.
#[derive(Default)]
pub struct EngineStore {
    documents: DashMap<DocumentId, Arc<Mutex<Document>>>,
    series: DashMap<SeriesId, Arc<Mutex<DocumentSeries>>>,
    parties: DashMap<PartyId, Arc<Mutex<PartyLedger>>>,
    registers: DashMap<CashRegisterId, Arc<Mutex<CashRegister>>>,
    products: DashMap<ProductId, Arc<Mutex<Product>>>,
    stock_movements: Mutex<Vec<StockMovement>>,
}

impl EngineStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Registration
    // ========================================================================

    /// Registers a document and returns its snapshot.
    pub fn insert_document(&self, document: Document) -> Document {
        let snapshot = document.clone();
        self.documents
            .insert(document.id, Arc::new(Mutex::new(document)));
        snapshot
    }

    /// Registers a numbering series and returns its snapshot.
    pub fn insert_series(&self, series: DocumentSeries) -> DocumentSeries {
        let snapshot = series.clone();
        self.series.insert(series.id, Arc::new(Mutex::new(series)));
        snapshot
    }

    /// Registers a party ledger and returns its snapshot.
    pub fn insert_party(&self, party: PartyLedger) -> PartyLedger {
        let snapshot = party.clone();
        self.parties.insert(party.id, Arc::new(Mutex::new(party)));
        snapshot
    }

    /// Registers a cash register and returns its snapshot.
    pub fn insert_register(&self, register: CashRegister) -> CashRegister {
        let snapshot = register.clone();
        self.registers
            .insert(register.id, Arc::new(Mutex::new(register)));
        snapshot
    }

    /// Registers a product and returns its snapshot.
    pub fn insert_product(&self, product: Product) -> Product {
        let snapshot = product.clone();
        self.products
            .insert(product.id, Arc::new(Mutex::new(product)));
        snapshot
    }

    // ========================================================================
    // Lock handles (for the lifecycle's critical sections)
    // ========================================================================

    /// Returns the lock handle for a document.
    pub fn document_handle(&self, id: DocumentId) -> Result<Arc<Mutex<Document>>, FiscalError> {
        self.documents
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(FiscalError::DocumentNotFound(id))
    }

    /// Returns the lock handle for a series.
    pub fn series_handle(&self, id: SeriesId) -> Result<Arc<Mutex<DocumentSeries>>, FiscalError> {
        self.series
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(FiscalError::SeriesNotFound(id))
    }

    /// Returns the lock handle for a party.
    pub fn party_handle(&self, id: PartyId) -> Result<Arc<Mutex<PartyLedger>>, FiscalError> {
        self.parties
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(FiscalError::PartyNotFound(id))
    }

    /// Returns the lock handle for a cash register.
    pub fn register_handle(
        &self,
        id: CashRegisterId,
    ) -> Result<Arc<Mutex<CashRegister>>, FiscalError> {
        self.registers
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(FiscalError::RegisterNotFound(id))
    }

    /// Returns the lock handle for a product.
    pub fn product_handle(&self, id: ProductId) -> Result<Arc<Mutex<Product>>, FiscalError> {
        self.products
            .get(&id)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or(FiscalError::ProductNotFound(id))
    }

    /// Returns product handles sorted by id, the tail of the global lock
    /// order for cross-entity operations.
    pub fn product_handles_sorted(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<(ProductId, Arc<Mutex<Product>>)>, FiscalError> {
        let mut sorted: Vec<ProductId> = ids.to_vec();
        sorted.sort_unstable();
        sorted.dedup();

        sorted
            .into_iter()
            .map(|id| Ok((id, self.product_handle(id)?)))
            .collect()
    }

    // ========================================================================
    // Read models (snapshots; never block writers for long)
    // ========================================================================

    /// Snapshot of a document.
    pub fn document(&self, id: DocumentId) -> Result<Document, FiscalError> {
        let handle = self.document_handle(id)?;
        let guard = lock_entity(&handle)?;
        Ok(guard.clone())
    }

    /// Snapshots of all documents, newest first.
    pub fn list_documents(&self) -> Result<Vec<Document>, FiscalError> {
        let mut documents = Vec::with_capacity(self.documents.len());
        for entry in &self.documents {
            documents.push(lock_entity(entry.value())?.clone());
        }
        documents.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(documents)
    }

    /// Snapshot of a series.
    pub fn series(&self, id: SeriesId) -> Result<DocumentSeries, FiscalError> {
        let handle = self.series_handle(id)?;
        let guard = lock_entity(&handle)?;
        Ok(guard.clone())
    }

    /// Snapshots of all series.
    pub fn list_series(&self) -> Result<Vec<DocumentSeries>, FiscalError> {
        let mut series = Vec::with_capacity(self.series.len());
        for entry in &self.series {
            series.push(lock_entity(entry.value())?.clone());
        }
        series.sort_by(|a, b| a.code.cmp(&b.code));
        Ok(series)
    }

    /// Snapshot of a party ledger (balance plus full history).
    pub fn party(&self, id: PartyId) -> Result<PartyLedger, FiscalError> {
        let handle = self.party_handle(id)?;
        let guard = lock_entity(&handle)?;
        Ok(guard.clone())
    }

    /// Snapshot of a cash register.
    pub fn register(&self, id: CashRegisterId) -> Result<CashRegister, FiscalError> {
        let handle = self.register_handle(id)?;
        let guard = lock_entity(&handle)?;
        Ok(guard.clone())
    }

    /// Snapshot of a product.
    pub fn product(&self, id: ProductId) -> Result<Product, FiscalError> {
        let handle = self.product_handle(id)?;
        let guard = lock_entity(&handle)?;
        Ok(guard.clone())
    }

    // ========================================================================
    // Stock movement log
    // ========================================================================

    /// Appends movements to the append-only log.
    pub fn append_movements(&self, movements: Vec<StockMovement>) -> Result<(), FiscalError> {
        let mut log = self
            .stock_movements
            .lock()
            .map_err(|_| FiscalError::ConcurrentModification)?;
        log.extend(movements);
        Ok(())
    }

    /// A page of the movement log plus the total count.
    pub fn movements_page(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<(Vec<StockMovement>, usize), FiscalError> {
        let log = self
            .stock_movements
            .lock()
            .map_err(|_| FiscalError::ConcurrentModification)?;
        let page = log.iter().skip(offset).take(limit).cloned().collect();
        Ok((page, log.len()))
    }
}
