//! A common view over things that happen to the character over time
//!
//! Buff instances and quest runs both have a start and an end; timelines
//! and activity feeds render them through this trait.

use chrono::{DateTime, Utc};

use crate::aggregates::{BuffInstance, QuestRun};

pub trait LifeEvent {
    fn name(&self) -> &str;
    fn start_time(&self) -> Option<DateTime<Utc>>;
    fn end_time(&self) -> Option<DateTime<Utc>>;
    fn describe_start(&self) -> String;
    fn describe_end(&self) -> String;
}

impl LifeEvent for BuffInstance {
    fn name(&self) -> &str {
        self.buff_name().as_str()
    }

    fn start_time(&self) -> Option<DateTime<Utc>> {
        Some(BuffInstance::start_time(self))
    }

    fn end_time(&self) -> Option<DateTime<Utc>> {
        Some(BuffInstance::end_time(self))
    }

    fn describe_start(&self) -> String {
        format!("Buff '{}' applied.", self.buff_name())
    }

    fn describe_end(&self) -> String {
        format!("Buff '{}' expired.", self.buff_name())
    }
}

impl LifeEvent for QuestRun {
    fn name(&self) -> &str {
        self.quest_name().as_str()
    }

    fn start_time(&self) -> Option<DateTime<Utc>> {
        QuestRun::start_time(self)
    }

    fn end_time(&self) -> Option<DateTime<Utc>> {
        QuestRun::end_time(self)
    }

    fn describe_start(&self) -> String {
        format!("Quest '{}' started.", self.quest_name())
    }

    fn describe_end(&self) -> String {
        format!("Quest '{}' ended.", self.quest_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregates::{Buff, Quest};
    use crate::value_objects::{BuffName, DifficultyLevel, QuestName, StatModifiers};
    use crate::CharacterId;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap()
    }

    #[test]
    fn buff_instance_describes_itself() {
        let buff = Buff::new(BuffName::new("Energized").unwrap(), StatModifiers::new(), now());
        let inst = BuffInstance::activate_now(&buff, CharacterId::new(), now()).unwrap();
        let events: Vec<&dyn LifeEvent> = vec![&inst];
        assert_eq!(events[0].name(), "Energized");
        assert_eq!(events[0].describe_start(), "Buff 'Energized' applied.");
        assert_eq!(events[0].describe_end(), "Buff 'Energized' expired.");
        assert_eq!(events[0].start_time(), Some(now()));
    }

    #[test]
    fn quest_run_describes_itself() {
        let quest = Quest::new(QuestName::new("Read").unwrap(), DifficultyLevel::Easy, now());
        let run = QuestRun::new(&quest, now());
        assert_eq!(run.describe_start(), "Quest 'Read' started.");
        assert_eq!(run.describe_end(), "Quest 'Read' ended.");
        assert_eq!(LifeEvent::start_time(&run), None);
    }
}
