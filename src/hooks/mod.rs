/*!
 * Auth hooks
 *
 * Responsibility:
 * - before/after hook の型 (HookContext, HookFn, HookMethod, HookProvider)
 * - 起動時に provider 自身の hook と HookProvider 群を 1 本の pipeline に畳み込む
 */

mod compose;
mod types;

pub use compose::wire_hooks;
pub use types::{
    ComposedHooks, HookConfig, HookContext, HookError, HookFn, HookFuture, HookMethod, HookPath,
    HookPhase, HookProvider, hook_fn,
};
