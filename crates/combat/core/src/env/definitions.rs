use crate::action::AbilityDefinition;
use crate::reaction::ReactionDefinition;
use crate::state::{AbilityId, CombatantTemplate, ReactionId, StatusId, TemplateId};
use crate::status::StatusDefinition;

/// Read-only lookup of content definitions.
///
/// The engine never mutates what it gets back; instances keep ids, not copies.
pub trait DefinitionOracle: Send + Sync {
    fn ability(&self, id: &AbilityId) -> Option<&AbilityDefinition>;

    fn status(&self, id: &StatusId) -> Option<&StatusDefinition>;

    fn reaction(&self, id: &ReactionId) -> Option<&ReactionDefinition>;

    fn template(&self, id: &TemplateId) -> Option<&CombatantTemplate>;

    /// Data-integrity warnings collected while the content was loaded.
    fn warnings(&self) -> &[String] {
        &[]
    }
}
