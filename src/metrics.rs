/// Prometheus metrics for the validation and rendering pipeline
///
/// Counters are process-wide and cheap to bump; hosts that expose a scrape
/// endpoint call [`MetricsCollector::encode`] on [`METRICS`].
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use prometheus_client::encoding::{EncodeLabelSet, text::encode};
use prometheus_client::metrics::counter::Counter;
use prometheus_client::metrics::family::Family;
use prometheus_client::registry::Registry;
use std::sync::Arc;

/// Global metrics registry instance
pub static METRICS: Lazy<Arc<MetricsCollector>> = Lazy::new(|| Arc::new(MetricsCollector::new()));

/// Labels for verdict outcomes
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct OutcomeLabels {
    /// "valid", "savable_with_warnings" or "rejected"
    pub outcome: String,
}

/// Labels for security findings
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct PatternLabels {
    /// Registry pattern source
    pub pattern: String,
}

/// Labels for sanitizer runs
#[derive(Clone, Debug, Hash, PartialEq, Eq, EncodeLabelSet)]
pub struct StrategyLabels {
    /// Injection strategy applied
    pub strategy: String,
}

/// Central metrics collector with Prometheus registry
pub struct MetricsCollector {
    registry: RwLock<Registry>,

    /// Validations by verdict outcome
    pub validations_total: Family<OutcomeLabels, Counter>,

    /// Security findings by pattern
    pub security_findings_total: Family<PatternLabels, Counter>,

    /// Sanitizer runs by injection strategy
    pub sanitizations_total: Family<StrategyLabels, Counter>,

    /// Documents handed to a sandboxed backend
    pub documents_loaded_total: Counter,

    /// Documents the renderer refused to load
    pub render_refusals_total: Counter,
}

impl MetricsCollector {
    /// Create a new metrics collector with all metrics registered
    pub fn new() -> Self {
        let mut registry = Registry::default();

        let validations_total = Family::<OutcomeLabels, Counter>::default();
        registry.register(
            "webstatic_validations",
            "Total number of content validations by outcome",
            validations_total.clone(),
        );

        let security_findings_total = Family::<PatternLabels, Counter>::default();
        registry.register(
            "webstatic_security_findings",
            "Total number of dangerous pattern findings",
            security_findings_total.clone(),
        );

        let sanitizations_total = Family::<StrategyLabels, Counter>::default();
        registry.register(
            "webstatic_sanitizations",
            "Total number of CSP sanitizer runs by strategy",
            sanitizations_total.clone(),
        );

        let documents_loaded_total = Counter::default();
        registry.register(
            "webstatic_documents_loaded",
            "Total number of documents loaded into a sandboxed renderer",
            documents_loaded_total.clone(),
        );

        let render_refusals_total = Counter::default();
        registry.register(
            "webstatic_render_refusals",
            "Total number of documents refused before rendering",
            render_refusals_total.clone(),
        );

        Self {
            registry: RwLock::new(registry),
            validations_total,
            security_findings_total,
            sanitizations_total,
            documents_loaded_total,
            render_refusals_total,
        }
    }

    /// Encode all metrics in Prometheus text format
    pub fn encode(&self) -> String {
        let mut buffer = String::new();
        let registry = self.registry.read();
        encode(&mut buffer, &registry).expect("encoding metrics should succeed");
        buffer
    }

    pub fn record_validation(&self, outcome: &str) {
        self.validations_total
            .get_or_create(&OutcomeLabels {
                outcome: outcome.to_string(),
            })
            .inc();
    }

    pub fn record_security_finding(&self, pattern: &str, matches: usize) {
        self.security_findings_total
            .get_or_create(&PatternLabels {
                pattern: pattern.to_string(),
            })
            .inc_by(matches as u64);
    }

    pub fn record_sanitization(&self, strategy: &str) {
        self.sanitizations_total
            .get_or_create(&StrategyLabels {
                strategy: strategy.to_string(),
            })
            .inc();
    }

    pub fn record_document_loaded(&self) {
        self.documents_loaded_total.inc();
    }

    pub fn record_render_refusal(&self) {
        self.render_refusals_total.inc();
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_contains_registered_metrics() {
        let collector = MetricsCollector::new();
        collector.record_validation("valid");
        collector.record_security_finding("eval\\s*\\(", 2);
        collector.record_sanitization("after_head");
        collector.record_document_loaded();

        let text = collector.encode();
        assert!(text.contains("webstatic_validations_total{outcome=\"valid\"} 1"));
        assert!(text.contains("webstatic_documents_loaded_total 1"));
        assert!(text.contains("webstatic_sanitizations_total{strategy=\"after_head\"} 1"));
    }

    #[test]
    fn test_finding_counter_adds_match_count() {
        let collector = MetricsCollector::new();
        collector.record_security_finding("localStorage", 3);
        let value = collector
            .security_findings_total
            .get_or_create(&PatternLabels {
                pattern: "localStorage".into(),
            })
            .get();
        assert_eq!(value, 3);
    }
}
