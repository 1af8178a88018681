//! Turns a [`StageKind`] order into concrete stages.

use stagehand_core::{SharedLogSink, Validator};
use stagehand_middleware::stages::{
    ClientErrorStage, CorsConfig, CorsStage, EventValidationStage, IoLoggingStage,
    JsonBodyParserStage, ResponseSerializerStage, SecurityHeadersConfig, SecurityHeadersStage,
    ServiceErrorStage,
};
use stagehand_middleware::{BoxedStage, HandlerMode, Pipeline, StageKind};
use std::sync::Arc;

/// Everything the built-in stages are configured from.
pub(crate) struct StageSettings {
    pub mode: HandlerMode,
    pub log: SharedLogSink,
    pub validator: Validator,
    pub cors: Option<CorsConfig>,
    pub security_headers: SecurityHeadersConfig,
}

/// Builds the pipeline for `settings.mode`.
///
/// The order comes from [`StageKind::for_mode`]; this function only
/// decides how each kind is constructed.
pub(crate) fn assemble(settings: &StageSettings) -> Pipeline {
    let kinds = StageKind::for_mode(settings.mode, settings.cors.is_some());
    let pipeline = kinds
        .into_iter()
        .filter_map(|kind| build_stage(kind, settings))
        .fold(Pipeline::builder(), |builder, stage| builder.boxed_stage(stage))
        .build();

    tracing::debug!(
        mode = ?settings.mode,
        stages = ?pipeline.stage_names(),
        "assembled handler pipeline"
    );
    pipeline
}

fn build_stage(kind: StageKind, settings: &StageSettings) -> Option<BoxedStage> {
    let stage: BoxedStage = match kind {
        StageKind::ClientError => Arc::new(ClientErrorStage::new(settings.mode)),
        StageKind::ServiceError => {
            Arc::new(ServiceErrorStage::new(settings.mode, Arc::clone(&settings.log)))
        }
        StageKind::IoLogging => Arc::new(IoLoggingStage::new(Arc::clone(&settings.log))),
        StageKind::Cors => Arc::new(CorsStage::new(settings.cors.clone()?)),
        StageKind::SecurityHeaders => {
            Arc::new(SecurityHeadersStage::new(settings.security_headers.clone()))
        }
        StageKind::JsonBodyParser => Arc::new(JsonBodyParserStage::new()),
        StageKind::EventValidation => {
            Arc::new(EventValidationStage::new(settings.validator.clone()))
        }
        StageKind::ResponseSerializer => Arc::new(ResponseSerializerStage::new()),
    };
    Some(stage)
}
