// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Callback dispatch of result messages by message type or ask.

use std::fmt::Debug;

use futures_util::future::BoxFuture;

use crate::{
    common::enums::{TechreadAsk, TechreadMessageType},
    websocket::TechreadMessage,
};

/// Condition selecting the messages a [`TechreadHook`] receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HookTrigger {
    /// Every message of the given type.
    MessageType(TechreadMessageType),
    /// Results of the given ask; the ask is added to the submission.
    Ask(TechreadAsk),
}

impl HookTrigger {
    /// Returns true if `message` should be delivered to a hook with this trigger.
    #[must_use]
    pub fn matches(&self, message: &TechreadMessage) -> bool {
        match self {
            Self::MessageType(message_type) => message.message_type == *message_type,
            Self::Ask(ask) => message.message_type == ask.result_type(),
        }
    }
}

enum HookCallback {
    Sync(Box<dyn FnMut(&TechreadMessage) + Send>),
    Async(Box<dyn FnMut(TechreadMessage) -> BoxFuture<'static, ()> + Send>),
}

impl HookCallback {
    fn from_async<F, Fut>(mut callback: F) -> Self
    where
        F: FnMut(TechreadMessage) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self::Async(Box::new(move |message| -> BoxFuture<'static, ()> {
            Box::pin(callback(message))
        }))
    }

    async fn call(&mut self, message: &TechreadMessage) {
        match self {
            Self::Sync(callback) => callback(message),
            Self::Async(callback) => callback(message.clone()).await,
        }
    }
}

/// A callback invoked for each message matching its trigger.
///
/// Callbacks run on the caller's task in stream order. An async callback receives its own copy
/// of the message and is awaited before the next message is pulled, so a slow hook applies
/// backpressure to the session.
pub struct TechreadHook {
    trigger: HookTrigger,
    callback: HookCallback,
}

impl Debug for TechreadHook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.callback {
            HookCallback::Sync(_) => "sync",
            HookCallback::Async(_) => "async",
        };
        f.debug_struct(stringify!(TechreadHook))
            .field("trigger", &self.trigger)
            .field("callback", &kind)
            .finish()
    }
}

impl TechreadHook {
    /// Creates a hook receiving every message of `message_type`.
    pub fn on_message_type(
        message_type: TechreadMessageType,
        callback: impl FnMut(&TechreadMessage) + Send + 'static,
    ) -> Self {
        Self {
            trigger: HookTrigger::MessageType(message_type),
            callback: HookCallback::Sync(Box::new(callback)),
        }
    }

    /// Creates a hook receiving the results of `ask`.
    pub fn on_ask(ask: TechreadAsk, callback: impl FnMut(&TechreadMessage) + Send + 'static) -> Self {
        Self {
            trigger: HookTrigger::Ask(ask),
            callback: HookCallback::Sync(Box::new(callback)),
        }
    }

    /// Creates a hook awaiting `callback` for every message of `message_type`.
    pub fn on_message_type_async<F, Fut>(message_type: TechreadMessageType, callback: F) -> Self
    where
        F: FnMut(TechreadMessage) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            trigger: HookTrigger::MessageType(message_type),
            callback: HookCallback::from_async(callback),
        }
    }

    /// Creates a hook awaiting `callback` for the results of `ask`.
    pub fn on_ask_async<F, Fut>(ask: TechreadAsk, callback: F) -> Self
    where
        F: FnMut(TechreadMessage) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        Self {
            trigger: HookTrigger::Ask(ask),
            callback: HookCallback::from_async(callback),
        }
    }

    #[must_use]
    pub fn trigger(&self) -> HookTrigger {
        self.trigger
    }

    /// Returns the ask this hook requires, if any.
    #[must_use]
    pub fn ask(&self) -> Option<TechreadAsk> {
        match self.trigger {
            HookTrigger::Ask(ask) => Some(ask),
            HookTrigger::MessageType(_) => None,
        }
    }
}

/// Invokes every hook matching `message` in registration order and returns how many were
/// invoked.
pub(crate) async fn dispatch(hooks: &mut [TechreadHook], message: &TechreadMessage) -> usize {
    let mut invoked = 0;
    for hook in hooks.iter_mut() {
        if !hook.trigger().matches(message) {
            continue;
        }
        hook.callback.call(message).await;
        invoked += 1;
    }
    invoked
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use rstest::rstest;

    use super::*;

    fn message(message_type: TechreadMessageType) -> TechreadMessage {
        TechreadMessage {
            request_id: None,
            message_type,
            payload_dict: None,
            payload_url: None,
            payload_bytes: None,
        }
    }

    #[rstest]
    #[case(HookTrigger::Ask(TechreadAsk::Measures), TechreadMessageType::AskMeasures, true)]
    #[case(HookTrigger::Ask(TechreadAsk::Measures), TechreadMessageType::AskResult, false)]
    #[case(HookTrigger::MessageType(TechreadMessageType::Completed), TechreadMessageType::Completed, true)]
    #[case(HookTrigger::MessageType(TechreadMessageType::Completed), TechreadMessageType::Rejection, false)]
    fn test_trigger_matches(
        #[case] trigger: HookTrigger,
        #[case] message_type: TechreadMessageType,
        #[case] expected: bool,
    ) {
        assert_eq!(trigger.matches(&message(message_type)), expected);
    }

    #[rstest]
    #[tokio::test]
    async fn test_dispatch_invokes_every_matching_hook() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_a = seen.clone();
        let seen_b = seen.clone();
        let mut hooks = vec![
            TechreadHook::on_ask(TechreadAsk::PageThumbnail, move |_| {
                seen_a.lock().unwrap().push("ask");
            }),
            TechreadHook::on_message_type(TechreadMessageType::AskPageThumbnail, move |_| {
                seen_b.lock().unwrap().push("type");
            }),
            TechreadHook::on_message_type(TechreadMessageType::Completed, |_| {
                panic!("must not be invoked");
            }),
        ];

        let invoked = dispatch(&mut hooks, &message(TechreadMessageType::AskPageThumbnail)).await;

        assert_eq!(invoked, 2);
        assert_eq!(*seen.lock().unwrap(), vec!["ask", "type"]);
        assert_eq!(hooks[0].ask(), Some(TechreadAsk::PageThumbnail));
        assert_eq!(hooks[1].ask(), None);
        assert_eq!(
            hooks[1].trigger(),
            HookTrigger::MessageType(TechreadMessageType::AskPageThumbnail)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn test_dispatch_awaits_async_hook_before_next() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_async = seen.clone();
        let seen_sync = seen.clone();
        let mut hooks = vec![
            TechreadHook::on_ask_async(TechreadAsk::Measures, move |message| {
                let seen = seen_async.clone();
                async move {
                    tokio::time::sleep(std::time::Duration::from_millis(20)).await;
                    seen.lock().unwrap().push(format!("async {}", message.message_type));
                }
            }),
            TechreadHook::on_message_type(TechreadMessageType::AskMeasures, move |message| {
                seen_sync
                    .lock()
                    .unwrap()
                    .push(format!("sync {}", message.message_type));
            }),
        ];

        let invoked = dispatch(&mut hooks, &message(TechreadMessageType::AskMeasures)).await;

        assert_eq!(invoked, 2);
        assert_eq!(
            *seen.lock().unwrap(),
            vec!["async ASK_MEASURES".to_string(), "sync ASK_MEASURES".to_string()]
        );
        assert_eq!(hooks[0].ask(), Some(TechreadAsk::Measures));
        assert!(format!("{:?}", hooks[0]).contains("async"));
    }

    #[rstest]
    #[tokio::test]
    async fn test_dispatch_without_match() {
        let mut hooks = vec![TechreadHook::on_ask(TechreadAsk::Measures, |_| {})];
        let invoked = dispatch(&mut hooks, &message(TechreadMessageType::ProcessingStarted)).await;
        assert_eq!(invoked, 0);
    }
}
