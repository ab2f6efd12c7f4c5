use crate::types::SceneAttributes;

/// Exact-match filters on the scene attributes of an image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SceneFilter {
    pub weather: Option<String>,
    pub scene: Option<String>,
    pub timeofday: Option<String>,
}

impl SceneFilter {
    pub fn is_empty(&self) -> bool {
        self.weather.is_none() && self.scene.is_none() && self.timeofday.is_none()
    }

    /// Every configured value must equal the corresponding attribute (case-sensitive).
    /// A missing attribute fails any filter configured on it.
    pub fn accepts(&self, attributes: Option<&SceneAttributes>) -> bool {
        if self.is_empty() {
            return true;
        }

        let Some(attributes) = attributes else {
            return false;
        };

        matches(&self.weather, &attributes.weather)
            && matches(&self.scene, &attributes.scene)
            && matches(&self.timeofday, &attributes.timeofday)
    }

    pub fn log_configuration(&self) {
        if let Some(weather) = &self.weather {
            log::info!("Limit to weather-type: {}", weather);
        }
        if let Some(scene) = &self.scene {
            log::info!("Limit to scene-type: {}", scene);
        }
        if let Some(timeofday) = &self.timeofday {
            log::info!("Limit to daytime-type: {}", timeofday);
        }
    }
}

fn matches(wanted: &Option<String>, actual: &Option<String>) -> bool {
    match wanted {
        None => true,
        Some(wanted) => actual.as_deref() == Some(wanted.as_str()),
    }
}
