//! Registry of executable actions and their legacy aliases.
//!
//! Two finite maps built once at startup and immutable afterwards: canonical
//! id to definition, and alias to canonical id. Construction fails fast when
//! a table violates the alias invariants (every alias targets a canonical id,
//! no alias shadows a canonical id, no alias is bound twice), so resolution
//! is always a single hop.

use std::collections::HashMap;

use crate::error::RegistryError;
use crate::types::{ActionDefinition, ActionId};
use opsdeck_core::types::Module;

/// How many actions compact surfaces (toolbars, chat shortcuts) show.
pub const PRIMARY_ACTION_LIMIT: usize = 3;

/// Immutable lookup tables for executable actions.
pub struct ActionRegistry {
    definitions: HashMap<ActionId, ActionDefinition>,
    aliases: HashMap<String, ActionId>,
}

impl ActionRegistry {
    /// Build a registry from definition and alias tables, validating the
    /// alias invariants.
    pub fn new(
        definitions: Vec<ActionDefinition>,
        aliases: Vec<(String, ActionId)>,
    ) -> Result<Self, RegistryError> {
        let mut definition_map = HashMap::with_capacity(definitions.len());
        for definition in definitions {
            if definition_map.contains_key(definition.id.as_str()) {
                return Err(RegistryError::DuplicateDefinition(definition.id));
            }
            definition_map.insert(definition.id.clone(), definition);
        }

        let mut alias_map: HashMap<String, ActionId> = HashMap::with_capacity(aliases.len());
        for (alias, target) in aliases {
            if definition_map.contains_key(alias.as_str()) {
                return Err(RegistryError::AliasShadowsCanonical(alias));
            }
            if !definition_map.contains_key(target.as_str()) {
                return Err(RegistryError::AliasTargetUnknown { alias, target });
            }
            if let Some(existing) = alias_map.get(&alias) {
                return Err(RegistryError::AliasRebound {
                    existing: existing.clone(),
                    duplicate: target,
                    alias,
                });
            }
            alias_map.insert(alias, target);
        }

        Ok(Self {
            definitions: definition_map,
            aliases: alias_map,
        })
    }

    /// The product's static action table.
    pub fn builtin() -> Self {
        Self::new(builtin_definitions(), builtin_aliases())
            .expect("builtin action table is valid")
    }

    /// Resolve an id through the alias map, then require membership in the
    /// canonical executable set. Returns `None` for anything else.
    pub fn normalize_executable_action_id(&self, id: &str) -> Option<ActionId> {
        if let Some(definition) = self.definitions.get(id) {
            return Some(definition.id.clone());
        }
        let canonical = self.aliases.get(id)?;
        self.definitions
            .get(canonical.as_str())
            .map(|definition| definition.id.clone())
    }

    /// Membership test against the canonical set only; no alias resolution.
    pub fn is_executable_action_id(&self, id: &ActionId) -> bool {
        self.definitions.contains_key(id.as_str())
    }

    /// Definition for a canonical id.
    pub fn definition(&self, id: &ActionId) -> Option<&ActionDefinition> {
        self.definitions.get(id.as_str())
    }

    /// All canonical definitions for a module, sorted by `ui_order`
    /// ascending, ties broken by id, for deterministic rendering.
    pub fn actions_for_module(&self, module: Module) -> Vec<&ActionDefinition> {
        let mut definitions: Vec<&ActionDefinition> = self
            .definitions
            .values()
            .filter(|definition| definition.module == module)
            .collect();
        definitions.sort_by(|a, b| a.ui_order.cmp(&b.ui_order).then_with(|| a.id.cmp(&b.id)));
        definitions
    }

    /// The leading actions of a module for compact surfaces.
    pub fn primary_actions(&self, module: Module) -> Vec<&ActionDefinition> {
        let mut definitions = self.actions_for_module(module);
        definitions.truncate(PRIMARY_ACTION_LIMIT);
        definitions
    }

    /// Number of canonical actions.
    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    /// Number of registered aliases.
    pub fn alias_count(&self) -> usize {
        self.aliases.len()
    }
}

fn definition(
    id: &str,
    module: Module,
    label: &str,
    description: &str,
    ui_order: i32,
    requires_approval: bool,
    icon: &str,
) -> ActionDefinition {
    ActionDefinition {
        id: ActionId::new(id),
        module,
        label: label.to_string(),
        description: description.to_string(),
        ui_order,
        requires_approval,
        icon: icon.to_string(),
    }
}

fn builtin_definitions() -> Vec<ActionDefinition> {
    vec![
        definition(
            "inbox.summarize",
            Module::Inbox,
            "Summarize thread",
            "Condense the conversation into a short summary",
            10,
            false,
            "sparkles",
        ),
        definition(
            "inbox.draft_reply",
            Module::Inbox,
            "Draft reply",
            "Draft a reply in the workspace tone for review",
            20,
            true,
            "pencil",
        ),
        definition(
            "inbox.translate",
            Module::Inbox,
            "Translate thread",
            "Translate the conversation into the workspace language",
            30,
            false,
            "globe",
        ),
        definition(
            "inbox.triage",
            Module::Inbox,
            "Suggest triage",
            "Suggest a queue, priority, and owner for the conversation",
            40,
            false,
            "inbox-stack",
        ),
        definition(
            "customers.summarize_account",
            Module::Customers,
            "Summarize account",
            "Summarize recent activity and open items for the account",
            10,
            false,
            "briefcase",
        ),
        definition(
            "customers.draft_followup",
            Module::Customers,
            "Draft follow-up",
            "Draft a follow-up message based on the latest touchpoint",
            20,
            true,
            "envelope",
        ),
        definition(
            "customers.enrich_profile",
            Module::Customers,
            "Enrich profile",
            "Fill missing profile fields from connected sources",
            30,
            true,
            "user-plus",
        ),
        definition(
            "documents.summarize",
            Module::Documents,
            "Summarize document",
            "Condense the document into key points",
            10,
            false,
            "document-text",
        ),
        definition(
            "documents.extract_terms",
            Module::Documents,
            "Extract key terms",
            "Pull out parties, dates, and obligations",
            20,
            false,
            "magnifying-glass",
        ),
        definition(
            "marketing.draft_campaign",
            Module::Marketing,
            "Draft campaign",
            "Draft campaign copy from the selected brief",
            10,
            true,
            "megaphone",
        ),
        definition(
            "marketing.segment_audience",
            Module::Marketing,
            "Segment audience",
            "Propose audience segments for the campaign",
            20,
            false,
            "users",
        ),
    ]
}

fn builtin_aliases() -> Vec<(String, ActionId)> {
    vec![
        ("inbox.draftReply".to_string(), ActionId::new("inbox.draft_reply")),
        ("inbox.summarise".to_string(), ActionId::new("inbox.summarize")),
        ("inbox.autoTriage".to_string(), ActionId::new("inbox.triage")),
        (
            "customers.followUp".to_string(),
            ActionId::new("customers.draft_followup"),
        ),
        (
            "documents.keyTerms".to_string(),
            ActionId::new("documents.extract_terms"),
        ),
        (
            "marketing.newCampaign".to_string(),
            ActionId::new("marketing.draft_campaign"),
        ),
    ]
}
