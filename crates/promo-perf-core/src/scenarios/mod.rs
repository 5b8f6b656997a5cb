pub mod model;
pub mod scenario;
pub mod sensitivity;

pub use model::{predict, ScenarioOverrides, ScenarioParameters, ScenarioPrediction, ScenarioVariable};
pub use scenario::{run_scenarios, NamedScenario, ScenarioRunInput, ScenarioRunOutput};
pub use sensitivity::{run_sensitivity, ScenarioMetric, SensitivityAxis, SensitivityInput};
