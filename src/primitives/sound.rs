pub trait SoundEffect {
    fn play(&self);
}

/// Stand-in for an audio backend: reports the effect through the logger.
pub struct LogSound {
    name: String,
}

impl LogSound {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl SoundEffect for LogSound {
    fn play(&self) {
        log::info!("playing sound effect '{}'", self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plays_through_trait_object() {
        let sound: Box<dyn SoundEffect> = Box::new(LogSound::new("moo"));
        sound.play();
        assert_eq!(LogSound::new(String::from("moo")).name(), "moo");
    }
}
