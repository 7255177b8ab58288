//! 进行中的外部请求登记
//!
//! 同一种操作同时只允许一个请求；登记凭证被丢弃时自动释放

use std::collections::HashSet;
use std::hash::Hash;
use std::sync::{Arc, Mutex};

#[derive(Debug)]
pub struct ActionTracker<A: Eq + Hash + Copy> {
    busy: Arc<Mutex<HashSet<A>>>,
}

impl<A: Eq + Hash + Copy> ActionTracker<A> {
    pub fn new() -> Self {
        Self {
            busy: Arc::new(Mutex::new(HashSet::new())),
        }
    }

    /// 登记操作；已在进行中时返回 `None`
    pub fn try_begin(&self, action: A) -> Option<ActionTicket<A>> {
        let mut busy = self.busy.lock().unwrap_or_else(|e| e.into_inner());
        if !busy.insert(action) {
            return None;
        }
        Some(ActionTicket {
            busy: Arc::clone(&self.busy),
            action,
        })
    }

    pub fn is_busy(&self, action: A) -> bool {
        self.busy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .contains(&action)
    }
}

impl<A: Eq + Hash + Copy> Clone for ActionTracker<A> {
    fn clone(&self) -> Self {
        Self {
            busy: Arc::clone(&self.busy),
        }
    }
}

impl<A: Eq + Hash + Copy> Default for ActionTracker<A> {
    fn default() -> Self {
        Self::new()
    }
}

/// 登记凭证
#[derive(Debug)]
pub struct ActionTicket<A: Eq + Hash + Copy> {
    busy: Arc<Mutex<HashSet<A>>>,
    action: A,
}

impl<A: Eq + Hash + Copy> Drop for ActionTicket<A> {
    fn drop(&mut self) {
        self.busy
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .remove(&self.action);
    }
}
