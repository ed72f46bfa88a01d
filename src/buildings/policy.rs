//! Per-kind selection rules plugged into the shared transfer/production loop.

use crate::shared::*;

/// What a building kind decides; the loop that calls it is shared.
pub trait TransferPolicy {
    /// Kind to pull from the player next, if the building wants one and the
    /// player has it.
    fn resource_needed(&self, stored: &ResourceLedger, player: &ResourceLedger) -> Option<ResourceKind>;

    /// Kind to hand to the player next, if any is waiting.
    fn resource_available(&self, stored: &ResourceLedger) -> Option<ResourceKind>;

    /// Enough input is stored to start a production run.
    fn on_production_ready(&self, _stored: &ResourceLedger) -> bool {
        false
    }

    fn production_secs(&self) -> f32 {
        0.0
    }

    /// Consume the inputs of one run and credit its yield. All-or-nothing:
    /// returns false and leaves `stored` untouched if an input ran short.
    fn finish_production(&self, _stored: &mut ResourceLedger) -> bool {
        false
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RecipeInput {
    pub kind: ResourceKind,
    pub amount: u32,
}

impl RecipeInput {
    pub fn new(kind: impl Into<ResourceKind>, amount: u32) -> Self {
        Self {
            kind: kind.into(),
            amount,
        }
    }
}

/// Inputs in declared order, one output. A processing building has exactly
/// one input; a crafting building has several and fills them in order.
#[derive(Debug, Clone, PartialEq)]
pub struct Recipe {
    pub inputs: Vec<RecipeInput>,
    pub output: ResourceKind,
    pub output_amount: u32,
    pub duration_secs: f32,
}

impl Recipe {
    pub fn processing(
        input: impl Into<ResourceKind>,
        input_amount: u32,
        output: impl Into<ResourceKind>,
        output_amount: u32,
        duration_secs: f32,
    ) -> Self {
        Self {
            inputs: vec![RecipeInput::new(input, input_amount)],
            output: output.into(),
            output_amount,
            duration_secs,
        }
    }

    pub fn crafting(
        inputs: Vec<RecipeInput>,
        output: impl Into<ResourceKind>,
        output_amount: u32,
        duration_secs: f32,
    ) -> Self {
        Self {
            inputs,
            output: output.into(),
            output_amount,
            duration_secs,
        }
    }
}

impl TransferPolicy for Recipe {
    fn resource_needed(&self, stored: &ResourceLedger, player: &ResourceLedger) -> Option<ResourceKind> {
        self.inputs
            .iter()
            .find(|input| stored.count(&input.kind) < input.amount && player.count(&input.kind) > 0)
            .map(|input| input.kind.clone())
    }

    fn resource_available(&self, stored: &ResourceLedger) -> Option<ResourceKind> {
        (stored.count(&self.output) > 0).then(|| self.output.clone())
    }

    fn on_production_ready(&self, stored: &ResourceLedger) -> bool {
        self.inputs.iter().all(|input| stored.has(&input.kind, input.amount))
    }

    fn production_secs(&self) -> f32 {
        self.duration_secs
    }

    fn finish_production(&self, stored: &mut ResourceLedger) -> bool {
        if !self.on_production_ready(stored) {
            return false;
        }
        for input in &self.inputs {
            stored.remove(&input.kind, input.amount);
        }
        stored.add(&self.output, self.output_amount);
        true
    }
}

/// Free storage for a declared list of kinds. No production.
#[derive(Debug, Clone, PartialEq)]
pub struct StorageManifest {
    pub storable: Vec<ResourceKind>,
}

impl TransferPolicy for StorageManifest {
    fn resource_needed(&self, _stored: &ResourceLedger, player: &ResourceLedger) -> Option<ResourceKind> {
        self.storable.iter().find(|kind| player.count(kind) > 0).cloned()
    }

    fn resource_available(&self, stored: &ResourceLedger) -> Option<ResourceKind> {
        self.storable.iter().find(|kind| stored.count(kind) > 0).cloned()
    }
}

/// The three building kinds, each delegating to its policy.
#[derive(Debug, Clone, PartialEq)]
pub enum BuildingFunction {
    Processing(Recipe),
    Crafting(Recipe),
    Storage(StorageManifest),
}

impl BuildingFunction {
    fn policy(&self) -> &dyn TransferPolicy {
        match self {
            BuildingFunction::Processing(recipe) | BuildingFunction::Crafting(recipe) => recipe,
            BuildingFunction::Storage(manifest) => manifest,
        }
    }

    pub fn verb(&self) -> &'static str {
        match self {
            BuildingFunction::Processing(_) => "Processing",
            BuildingFunction::Crafting(_) => "Crafting",
            BuildingFunction::Storage(_) => "Storing",
        }
    }
}

impl TransferPolicy for BuildingFunction {
    fn resource_needed(&self, stored: &ResourceLedger, player: &ResourceLedger) -> Option<ResourceKind> {
        self.policy().resource_needed(stored, player)
    }

    fn resource_available(&self, stored: &ResourceLedger) -> Option<ResourceKind> {
        self.policy().resource_available(stored)
    }

    fn on_production_ready(&self, stored: &ResourceLedger) -> bool {
        self.policy().on_production_ready(stored)
    }

    fn production_secs(&self) -> f32 {
        self.policy().production_secs()
    }

    fn finish_production(&self, stored: &mut ResourceLedger) -> bool {
        self.policy().finish_production(stored)
    }
}
