//! Published events, subscriptions, and rule hooks.

mod bus;
mod hooks;
mod kinds;

pub use bus::{EventBus, EventSubscriber, SubscriptionId};
pub use hooks::{HookModifier, RuleHook, RuleHooks, RuleWindow, StatusRollBonusHook, WindowKind};
pub use kinds::{CombatEvent, ConcentrationEnd, EventKind, Topic};
