//! 알림 센터.
//!
//! 단일 슬롯 토스트 알림. 새 알림은 이전 알림을 대체하고 이전 만료 타이머를 취소한다.
//! 놓친 알림을 쌓아두는 큐는 없다.

use caseflow_core::models::notification::{Notification, NotificationSeverity};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

/// 기본 표시 시간 (밀리초)
pub const DEFAULT_DISPLAY_MS: u64 = 4_000;

/// 현재 슬롯의 세대 번호와 만료 타이머
#[derive(Default)]
struct Slot {
    generation: u64,
    timer: Option<JoinHandle<()>>,
}

struct Inner {
    slot: Mutex<Slot>,
    tx: watch::Sender<Option<Notification>>,
}

impl Inner {
    /// 만료 타이머 콜백. 그 사이 새 알림이 게시됐으면 아무것도 하지 않는다.
    fn expire(&self, generation: u64) {
        let mut slot = self.slot.lock();
        if slot.generation != generation {
            return;
        }
        slot.timer = None;
        self.tx.send_replace(None);
        debug!("알림 만료 (세대 {generation})");
    }
}

/// 알림 센터 — 가장 최근 알림 하나만 표시
pub struct NotificationCenter {
    inner: Arc<Inner>,
    display: Duration,
}

impl NotificationCenter {
    /// 새 알림 센터 생성
    pub fn new(display_ms: u64) -> Self {
        let (tx, _rx) = watch::channel(None);
        Self {
            inner: Arc::new(Inner {
                slot: Mutex::new(Slot::default()),
                tx,
            }),
            display: Duration::from_millis(display_ms),
        }
    }

    /// 알림 게시.
    ///
    /// 현재 알림을 대체하고 `display_ms` 후 자동 해제를 예약한다.
    /// tokio 런타임 밖에서 호출되면 자동 해제 없이 다음 게시/해제까지 유지된다.
    pub fn publish(&self, message: impl Into<String>, severity: NotificationSeverity) -> Notification {
        let display_ms = u64::try_from(self.display.as_millis()).unwrap_or(u64::MAX);
        let notification = Notification::new(message, severity, display_ms);

        let mut slot = self.inner.slot.lock();
        if let Some(previous) = slot.timer.take() {
            previous.abort();
        }
        slot.generation += 1;
        let generation = slot.generation;

        self.inner.tx.send_replace(Some(notification.clone()));
        debug!("알림 게시 ({severity:?}): {}", notification.message);

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let inner = Arc::clone(&self.inner);
                let display = self.display;
                slot.timer = Some(handle.spawn(async move {
                    tokio::time::sleep(display).await;
                    inner.expire(generation);
                }));
            }
            Err(_) => warn!("tokio 런타임 없음 — 알림 자동 해제 생략"),
        }

        notification
    }

    pub fn success(&self, message: impl Into<String>) -> Notification {
        self.publish(message, NotificationSeverity::Success)
    }

    pub fn error(&self, message: impl Into<String>) -> Notification {
        self.publish(message, NotificationSeverity::Error)
    }

    pub fn info(&self, message: impl Into<String>) -> Notification {
        self.publish(message, NotificationSeverity::Info)
    }

    /// 현재 알림 즉시 해제
    pub fn dismiss(&self) {
        let mut slot = self.inner.slot.lock();
        if let Some(timer) = slot.timer.take() {
            timer.abort();
        }
        slot.generation += 1;
        self.inner.tx.send_replace(None);
    }

    /// 현재 표시 중인 알림
    pub fn current(&self) -> Option<Notification> {
        self.inner.tx.borrow().clone()
    }

    /// 알림 변경 구독 (UI 바인딩용)
    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.inner.tx.subscribe()
    }

    /// 만료 대기 중인 타이머가 있는지
    pub fn has_pending_timer(&self) -> bool {
        self.inner
            .slot
            .lock()
            .timer
            .as_ref()
            .is_some_and(|t| !t.is_finished())
    }
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_DISPLAY_MS)
    }
}

impl Drop for NotificationCenter {
    fn drop(&mut self) {
        if let Some(timer) = self.inner.slot.lock().timer.take() {
            timer.abort();
        }
    }
}
