//! Built-in workouts used whenever the model cannot produce a plan.

use serde_json::Value;
use tracing::debug;

use guardian_common::models::{Exercise, NormalizedPayload, WorkoutType};

/// Catalog entry for a workout type. `Custom` has no entry of its own and
/// uses the strength routine.
pub fn default_exercises(workout_type: WorkoutType) -> Vec<Exercise> {
    match workout_type {
        WorkoutType::Strength | WorkoutType::Custom => vec![
            Exercise::new("Push-ups", 3, 12, 5, "Keep your core tight and back straight"),
            Exercise::new("Squats", 3, 15, 5, "Keep knees behind toes"),
            Exercise::new("Plank", 3, 1, 3, "Hold for 30-60 seconds"),
            Exercise::new("Lunges", 3, 10, 5, "Alternate legs, keep form tight"),
            Exercise::new("Dumbbell Rows", 3, 12, 5, "Pull to your hip, squeeze shoulder blades"),
        ],
        WorkoutType::Cardio => vec![
            Exercise::new("Jumping Jacks", 3, 30, 3, "Keep steady rhythm"),
            Exercise::new("High Knees", 3, 30, 3, "Drive knees up high"),
            Exercise::new("Burpees", 3, 10, 5, "Full body engagement"),
            Exercise::new("Mountain Climbers", 3, 20, 4, "Keep core tight"),
        ],
        WorkoutType::Yoga => vec![
            Exercise::new("Downward Dog", 3, 1, 3, "Hold for 30 seconds, breathe deeply"),
            Exercise::new("Warrior Pose", 3, 1, 3, "Hold each side for 30 seconds"),
            Exercise::new("Child's Pose", 2, 1, 4, "Relax and breathe"),
            Exercise::new("Tree Pose", 3, 1, 3, "Focus on balance"),
        ],
        WorkoutType::Flexibility => vec![
            Exercise::new("Hamstring Stretch", 3, 1, 3, "Hold 30 seconds each leg"),
            Exercise::new("Quad Stretch", 3, 1, 3, "Balance and stretch"),
            Exercise::new("Shoulder Stretch", 3, 1, 2, "Gentle pull across body"),
            Exercise::new("Hip Flexor Stretch", 3, 1, 3, "Lunge position, hold"),
        ],
    }
}

/// Exercises from a `WorkoutPlan` payload. Entries that do not deserialize
/// are skipped; `None` if nothing usable remains.
pub fn exercises_from_payload(payload: &NormalizedPayload) -> Option<Vec<Exercise>> {
    let entries = payload.list("exercises")?;
    let exercises: Vec<Exercise> = entries
        .iter()
        .filter_map(|entry| match serde_json::from_value::<Exercise>(entry.clone()) {
            Ok(exercise) if !exercise.name.trim().is_empty() => Some(exercise),
            Ok(_) => None,
            Err(e) => {
                debug!("skipping malformed exercise {}: {}", compact(entry), e);
                None
            }
        })
        .collect();

    if exercises.is_empty() { None } else { Some(exercises) }
}

fn compact(value: &Value) -> String {
    let text = value.to_string();
    text.chars().take(80).collect()
}
