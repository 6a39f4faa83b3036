//! Metrics recorder for paced transfers and echo sessions

use crate::transfer::{DownloadReport, UploadReport};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram, gauge, histogram};
use std::sync::atomic::{AtomicBool, Ordering};

static METRICS_INITIALIZED: AtomicBool = AtomicBool::new(false);

fn mode(limited: bool) -> &'static str {
    if limited {
        "limited"
    } else {
        "unlimited"
    }
}

/// Initialize metric descriptions (call once at startup)
pub fn init_metrics() {
    if METRICS_INITIALIZED.swap(true, Ordering::SeqCst) {
        return;
    }

    describe_counter!(
        "bloatmeter_download_bytes_total",
        "Total payload bytes handed to download responses"
    );
    describe_counter!(
        "bloatmeter_upload_bytes_total",
        "Total upload bytes accounted by the sink"
    );
    describe_counter!(
        "bloatmeter_downloads_completed_total",
        "Downloads that delivered their full payload"
    );
    describe_counter!(
        "bloatmeter_downloads_aborted_total",
        "Downloads stopped by a client disconnect"
    );
    describe_counter!(
        "bloatmeter_uploads_completed_total",
        "Uploads that reached stream end"
    );
    describe_counter!(
        "bloatmeter_uploads_failed_total",
        "Uploads that timed out or hit a stream error"
    );
    describe_counter!(
        "bloatmeter_echo_messages_total",
        "Echo channel events answered"
    );

    describe_gauge!(
        "bloatmeter_active_sessions",
        "Number of connected echo sessions"
    );

    describe_histogram!(
        "bloatmeter_transfer_mbps",
        "Effective throughput of finished transfers in Mbps"
    );
    describe_histogram!(
        "bloatmeter_transfer_duration_seconds",
        "Wall-clock duration of finished transfers"
    );
}

// ============== Transfers ==============

/// Record a download that sent its full payload
pub fn record_download_complete(report: &DownloadReport) {
    let mode = mode(report.limited);
    counter!("bloatmeter_download_bytes_total", "mode" => mode).increment(report.bytes_sent);
    counter!("bloatmeter_downloads_completed_total", "mode" => mode).increment(1);
    histogram!("bloatmeter_transfer_mbps", "direction" => "download").record(report.mbps);
    histogram!("bloatmeter_transfer_duration_seconds", "direction" => "download")
        .record(report.elapsed_ms as f64 / 1000.0);
}

/// Record a download cut short by the client
pub fn record_download_aborted(bytes_sent: u64) {
    counter!("bloatmeter_download_bytes_total", "mode" => "aborted").increment(bytes_sent);
    counter!("bloatmeter_downloads_aborted_total").increment(1);
}

/// Record an upload that reached stream end and was fully drained
pub fn record_upload_complete(report: &UploadReport) {
    let mode = mode(report.limited);
    counter!("bloatmeter_upload_bytes_total", "mode" => mode).increment(report.bytes_received);
    counter!("bloatmeter_uploads_completed_total", "mode" => mode).increment(1);
    histogram!("bloatmeter_transfer_mbps", "direction" => "upload").record(report.speed_mbps);
    histogram!("bloatmeter_transfer_duration_seconds", "direction" => "upload")
        .record(report.duration_ms as f64 / 1000.0);
}

/// Record an upload that ended without a report
pub fn record_upload_failed(reason: &'static str) {
    counter!("bloatmeter_uploads_failed_total", "reason" => reason).increment(1);
}

// ============== Echo Sessions ==============

pub fn record_session_opened() {
    gauge!("bloatmeter_active_sessions").increment(1.0);
}

pub fn record_session_closed() {
    gauge!("bloatmeter_active_sessions").decrement(1.0);
}

/// Record one answered echo event
pub fn record_echo_message(event: &'static str) {
    counter!("bloatmeter_echo_messages_total", "event" => event).increment(1);
}
