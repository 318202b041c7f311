//! Main application server

use std::sync::Arc;
use std::time::Instant;

use actix_web::{dev, web, HttpServer};
use cadence::StatsdClient;

use ehr_common::db::client::CellStoreClient;
use ehr_common::db::hbase::HBaseClientImpl;
use ehr_common::errors::{EhrError, EhrErrorKind};
use ehr_common::records::RecordService;
use ehr_common::schema::RecordKind;

use crate::error::{ApiError, ApiResult};
use crate::metrics::{metrics_from_settings, MetricName, StatsdClientExt};
use crate::routes::{admin, dashboard, health, patients};
use crate::settings::Settings;

#[derive(Clone)]
pub struct AppState {
    pub metrics: Arc<StatsdClient>,
    pub settings: Settings,
    pub records: RecordService,
    /// When the server started, for reporting uptime
    pub started: Instant,
}

impl AppState {
    pub fn from_settings(settings: Settings) -> ApiResult<Self> {
        let http = reqwest::Client::builder()
            .build()
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        let store = HBaseClientImpl::new(&settings.store_settings(), http)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Self::with_store(settings, Box::new(store))
    }

    pub fn with_store(settings: Settings, store: Box<dyn CellStoreClient>) -> ApiResult<Self> {
        let metrics = Arc::new(metrics_from_settings(&settings)?);
        let records = RecordService::new(store, settings.row_keys());
        Ok(Self {
            metrics,
            settings,
            records,
            started: Instant::now(),
        })
    }

    /// Count a successful write to the table backing `kind`.
    pub fn record_written(&self, kind: RecordKind) {
        self.metrics
            .incr_with_tags(MetricName::RecordWrite)
            .with_tag("table", kind.table())
            .send();
    }

    pub fn record_read(&self, kind: RecordKind) {
        self.metrics
            .incr_with_tags(MetricName::RecordRead)
            .with_tag("table", kind.table())
            .send();
    }

    /// Count a failed record operation and convert it for the response.
    pub fn fail(&self, summary: &'static str, error: EhrError) -> ApiError {
        match &error.kind {
            EhrErrorKind::Validation(e) => {
                debug!("Rejected request: {}", e);
                let _ = self.metrics.incr(MetricName::RecordValidationError);
            }
            EhrErrorKind::Store(e) => {
                error!("{}: {}", summary, e);
                self.metrics
                    .incr_with_tags(MetricName::StoreError)
                    .with_tag("reason", e.metric_label())
                    .send();
            }
            other => error!("{}: {}", summary, other),
        }
        ApiError::from_ehr(summary, error)
    }
}

#[macro_export]
macro_rules! build_app {
    ($app_state: expr, $config: expr) => {
        actix_web::App::new()
            .app_data(actix_web::web::Data::new($app_state.clone()))
            .app_data(
                actix_web::web::JsonConfig::default()
                    .limit($app_state.settings.max_data_bytes)
                    .error_handler(|err, _req| {
                        $crate::error::ApiError::Payload(err.to_string()).into()
                    }),
            )
            .app_data(
                actix_web::web::QueryConfig::default().error_handler(|err, _req| {
                    $crate::error::ApiError::Payload(err.to_string()).into()
                }),
            )
            .wrap(actix_web::middleware::ErrorHandlers::new().handler(
                actix_http::StatusCode::NOT_FOUND,
                $crate::error::render_404,
            ))
            .wrap(actix_cors::Cors::permissive())
            .configure($config)
    };
}

/// The publicly exposed app config
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg
        // Health checks
        .service(web::resource("/status").route(web::get().to(health::status_route)))
        .service(web::resource("/health").route(web::get().to(health::health_route)))
        // Dockerflow
        .service(web::resource("/__heartbeat__").route(web::get().to(health::health_route)))
        .service(
            web::resource("/__lbheartbeat__").route(web::get().to(health::lb_heartbeat_route)),
        )
        // Store administration
        .service(web::resource("/api/test-hbase").route(web::get().to(admin::test_store_route)))
        .service(
            web::resource("/api/init-tables").route(web::post().to(admin::init_tables_route)),
        )
        .service(web::resource("/api/sample-data").route(web::get().to(admin::sample_data_route)))
        .service(
            web::resource("/api/load-sample-data")
                .route(web::post().to(admin::load_sample_data_route)),
        )
        // Dashboard
        .service(web::resource("/api/dashboard").route(web::get().to(dashboard::dashboard_route)))
        .service(
            web::resource("/api/patients/search").route(web::get().to(dashboard::search_route)),
        )
        // Patient records
        .service(
            web::resource("/api/patients")
                .route(web::get().to(patients::list_patients_route))
                .route(web::post().to(patients::add_patient_route)),
        )
        .service(
            web::resource("/api/patients/{patient_id}")
                .route(web::get().to(patients::get_patient_route)),
        )
        .service(
            web::resource("/api/patients/{patient_id}/medical-history")
                .route(web::post().to(patients::add_condition_route)),
        )
        .service(
            web::resource("/api/patients/{patient_id}/prescriptions")
                .route(web::post().to(patients::add_prescription_route)),
        )
        .service(
            web::resource("/api/patients/{patient_id}/lab-reports")
                .route(web::post().to(patients::add_lab_report_route)),
        )
        .service(
            web::resource("/api/patients/{patient_id}/visits")
                .route(web::post().to(patients::add_visit_route)),
        );
}

pub struct Server;

impl Server {
    pub fn with_settings(settings: Settings) -> ApiResult<dev::Server> {
        let bind_address = (settings.host.clone(), settings.port);
        let app_state = AppState::from_settings(settings)?;
        info!(
            "Starting ehr-endpoint on {}:{} (store: {})",
            bind_address.0, bind_address.1, app_state.settings.store_url
        );
        let server = HttpServer::new(move || build_app!(app_state, config))
            .bind(bind_address)?
            .run();
        Ok(server)
    }
}
