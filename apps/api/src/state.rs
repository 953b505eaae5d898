//! Shared application state.
//!
//! Built once at startup and handed to the router as `Arc<AppState>`.

use std::sync::Arc;

use smartsales_core::gateway::PaymentGateway;
use smartsales_core::report::ReportParser;
use smartsales_db::{
    CartService, CheckoutService, Database, ReconciliationService, ReportService, SaleService, ServiceResult,
};

use crate::transcription::Transcriber;

pub struct AppState {
    pub db: Database,
    pub gateway: Arc<dyn PaymentGateway>,
    pub carts: CartService,
    pub checkout: CheckoutService,
    pub reconciliation: ReconciliationService,
    pub sales: SaleService,
    pub reports: ReportService,
    /// `None` when no transcription service is configured.
    pub transcriber: Option<Arc<dyn Transcriber>>,
}

impl AppState {
    /// Wires every service onto the same pool and gateway.
    ///
    /// ## Errors
    /// `currency` is not a three-letter ISO code.
    pub fn new(db: Database, gateway: Arc<dyn PaymentGateway>, currency: &str) -> ServiceResult<Self> {
        Ok(AppState {
            carts: CartService::new(db.clone()),
            checkout: CheckoutService::new(db.clone(), gateway.clone()).with_currency(currency)?,
            reconciliation: ReconciliationService::new(db.clone(), gateway.clone()),
            sales: SaleService::new(db.clone()),
            reports: ReportService::new(db.clone()),
            transcriber: None,
            gateway,
            db,
        })
    }

    pub fn with_transcriber(mut self, transcriber: Arc<dyn Transcriber>) -> Self {
        self.transcriber = Some(transcriber);
        self
    }

    /// Pins the report parser's notion of "today".
    pub fn with_report_parser(mut self, parser: ReportParser) -> Self {
        self.reports = self.reports.with_parser(parser);
        self
    }
}
