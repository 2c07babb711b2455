//! Read-only menu projections over the registry for UI surfaces.
//!
//! Ordering comes from the registry's deterministic sort; these functions
//! only project definitions into display rows and, for context-sensitive
//! surfaces, filter out actions the current context cannot support.

use serde::Serialize;

use crate::registry::ActionRegistry;
use crate::types::{ActionContext, ActionDefinition, ActionId};
use opsdeck_core::types::Module;

/// One row of an action menu.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionMenuItem {
    pub id: ActionId,
    pub label: String,
    pub description: String,
    pub icon: String,
    pub requires_approval: bool,
}

fn menu_item(definition: &ActionDefinition) -> ActionMenuItem {
    ActionMenuItem {
        id: definition.id.clone(),
        label: definition.label.clone(),
        description: definition.description.clone(),
        icon: definition.icon.clone(),
        requires_approval: definition.requires_approval,
    }
}

/// Full action menu for a module.
pub fn module_menu(registry: &ActionRegistry, module: Module) -> Vec<ActionMenuItem> {
    registry
        .actions_for_module(module)
        .into_iter()
        .map(menu_item)
        .collect()
}

/// Compact menu for toolbars and chat shortcuts.
pub fn primary_menu(registry: &ActionRegistry, module: Module) -> Vec<ActionMenuItem> {
    registry
        .primary_actions(module)
        .into_iter()
        .map(menu_item)
        .collect()
}

/// Menu of actions the given context can actually support.
///
/// Empty when the context has no target; otherwise the target module's
/// actions whose required context field is present.
pub fn context_menu(registry: &ActionRegistry, context: &ActionContext) -> Vec<ActionMenuItem> {
    let Some(target) = &context.target else {
        return Vec::new();
    };
    registry
        .actions_for_module(target.module)
        .into_iter()
        .filter(|definition| context_is_usable(definition, context))
        .map(menu_item)
        .collect()
}

/// Field each module requires in its context section before an action can
/// be offered.
fn required_context_field(module: Module) -> Option<&'static str> {
    match module {
        Module::Inbox => Some("itemId"),
        Module::Customers => Some("customerId"),
        Module::Documents => Some("documentId"),
        Module::Marketing | Module::Settings => None,
    }
}

/// Whether an affordance for `definition` should be enabled for `context`.
pub fn context_is_usable(definition: &ActionDefinition, context: &ActionContext) -> bool {
    let Some(target) = &context.target else {
        return false;
    };
    if target.module != definition.module {
        return false;
    }
    match required_context_field(definition.module) {
        None => true,
        Some(field) => context
            .module_context
            .as_ref()
            .and_then(|value| value.get(definition.module.as_str()))
            .and_then(|section| section.get(field))
            .map(|value| !value.is_null())
            .unwrap_or(false),
    }
}
