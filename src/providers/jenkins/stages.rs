use super::types::{millis_to_duration, RawStage, RawStageList, Stage};

fn stage_from_raw(raw: RawStage) -> Stage {
    Stage {
        name: raw.name,
        status: raw.status,
        duration: millis_to_duration(raw.duration_millis),
    }
}

/// Maps every stage of a `wfapi` response, in order: N raw stages give N
/// records.
pub(crate) fn stages_from_raw(raw: RawStageList) -> Vec<Stage> {
    raw.stages.into_iter().map(stage_from_raw).collect()
}
