//! 콘솔 출력.
//!
//! 프레젠터 뷰 모델을 터미널 텍스트로 렌더링한다.

use caseflow_core::models::case::Case;
use caseflow_core::models::health::HealthStatus;
use caseflow_core::models::notification::{Notification, NotificationSeverity};
use caseflow_workflow::escalation::{Escalation, EscalationKind};
use caseflow_workflow::presenter::{AlertIndicator, IcmAlertView, SimilarCaseView};

pub fn print_notification(notification: Option<&Notification>) {
    let Some(n) = notification else {
        return;
    };
    let icon = match n.severity {
        NotificationSeverity::Success => "✅",
        NotificationSeverity::Error => "❌",
        NotificationSeverity::Info => "ℹ️ ",
    };
    println!("{icon} {}", n.message);
}

pub fn print_similar_cases(views: &[SimilarCaseView]) {
    if views.is_empty() {
        println!("   (유사 케이스 없음)");
        return;
    }
    for view in views {
        println!(
            "  {:>2}. [{}] {} — {} {}",
            view.rank, view.case_id, view.title, view.score_label, view.percent_text
        );
        println!(
            "      {} · Sev {} · {}",
            view.product,
            view.severity,
            view.status.as_deref().unwrap_or("-")
        );
        if let Some(resolution) = &view.resolution {
            println!("      해결: {resolution}");
        }
    }
}

pub fn print_indicator(indicator: &AlertIndicator) {
    if !indicator.active {
        return;
    }
    let source = if indicator.synthetic { " (demo data)" } else { "" };
    println!(
        "🚩 경보: 임계값 이상 {}건, 최고 {}{source}",
        indicator.count, indicator.highest_text
    );
}

pub fn print_alert(view: &IcmAlertView) {
    println!();
    println!("┌─ ICM Recommended ─────────────────────────────────────────");
    println!(
        "│ Highest similarity {} (threshold {})",
        view.score_percent_text, view.threshold_text
    );
    for reason in &view.reasons {
        println!("│ • {}: {}", reason.title, reason.detail);
    }
    println!("├─ Top matches");
    for m in &view.top_matches {
        println!("│ {}. [{}] {} ({})", m.rank, m.case_id, m.title, m.confidence_text);
        println!("│    Sev {} · {}", m.severity, m.status.as_deref().unwrap_or("-"));
        println!("│    {}", m.excerpt);
    }
    if view.synthetic {
        println!("│ (demo data)");
    }
    println!("└───────────────────────────────────────────────────────────");
}

pub fn print_escalation(escalation: &Escalation) {
    let heading = match &escalation.kind {
        EscalationKind::NewIncident => "새 ICM 생성".to_string(),
        EscalationKind::Duplicate { incident_id, .. } => format!("ICM #{incident_id} 복제"),
    };
    let form = &escalation.form;
    println!("📝 {heading}");
    println!("   Support topic : {}", form.support_topic);
    println!(
        "   Template      : {} ({})",
        form.template,
        form.template_id().unwrap_or("-")
    );
    println!("   Severity      : {}", form.severity);
    println!("   Title         : {}", form.title);
    println!("   Service       : {}", form.impacted_service);
}

pub fn print_case(case: &Case) {
    let d = &case.details;
    println!(
        "#{} [{}] {} — {} · Sev {} · {}",
        case.case_id,
        case.created_date.format("%Y-%m-%d %H:%M"),
        d.title,
        d.product,
        d.severity,
        d.case_status.as_deref().unwrap_or("-")
    );
    let tags = d.tag_list();
    if !tags.is_empty() {
        println!("   태그: {}", tags.join(", "));
    }
}

pub fn print_health(health: &HealthStatus) {
    let icon = if health.is_ready() { "✅" } else { "⚠️ " };
    println!(
        "{icon} status={} database={} model_loaded={} ({})",
        health.status, health.database, health.model_loaded, health.timestamp
    );
}
