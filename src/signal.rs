use log::warn;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// 註冊 Ctrl-C 處理器，觸發後各流程在下一個檢查點停止
#[must_use]
pub fn setup_shutdown_signal() -> Arc<AtomicBool> {
    let shutdown_signal = Arc::new(AtomicBool::new(false));
    let signal_clone = Arc::clone(&shutdown_signal);

    ctrlc::set_handler(move || {
        if signal_clone.swap(true, Ordering::SeqCst) {
            return;
        }
        warn!("收到中斷信號");
        eprintln!("\n收到中斷信號，完成目前的搬移後停止...");
    })
    .expect("無法設定 Ctrl-C 處理器");

    shutdown_signal
}
