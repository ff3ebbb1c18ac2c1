use chrono::{DateTime, Duration, FixedOffset, SecondsFormat};
use rand::Rng;
use rand::seq::SliceRandom;

use crate::fixture::Fixture;
use crate::timing::display_zone;

const CLUBS: [(&str, &str); 16] = [
    ("Broncos", "Suncorp Stadium"),
    ("Cowboys", "Queensland Country Bank Stadium"),
    ("Rabbitohs", "Accor Stadium"),
    ("Roosters", "Allianz Stadium"),
    ("Sharks", "PointsBet Stadium"),
    ("Storm", "AAMI Park"),
    ("Panthers", "BlueBet Stadium"),
    ("Eels", "CommBank Stadium"),
    ("Sea Eagles", "4 Pines Park"),
    ("Knights", "McDonald Jones Stadium"),
    ("Raiders", "GIO Stadium"),
    ("Titans", "Cbus Super Stadium"),
    ("Dragons", "WIN Stadium"),
    ("Bulldogs", "Belmore Sports Ground"),
    ("Warriors", "Go Media Stadium"),
    ("Dolphins", "Kayo Stadium"),
];

const ROUNDS: u32 = 6;
const CURRENT_ROUND: u32 = 3;
// Minutes from the round anchor. In the current round this gives one live
// fixture, one about 45 minutes out and two later ones.
const SLOT_OFFSETS_MIN: [i64; 4] = [-40, 45, 180, 1500];

/// A small season laid out around `now` so every status shows up: finals in
/// earlier rounds (one still missing its result), a live game, and upcoming
/// rounds.
pub fn demo_season<R: Rng>(now: DateTime<FixedOffset>, rng: &mut R) -> Vec<Fixture> {
    let anchor_now = now.with_timezone(&display_zone());
    let mut out = Vec::new();
    let mut clubs = CLUBS.to_vec();

    for round in 1..=ROUNDS {
        clubs.shuffle(rng);
        let weeks = i64::from(round) - i64::from(CURRENT_ROUND);
        let anchor = anchor_now + Duration::weeks(weeks);

        for (slot, offset) in SLOT_OFFSETS_MIN.iter().enumerate() {
            let (home, venue) = clubs[slot * 2];
            let (away, _) = clubs[slot * 2 + 1];
            let kickoff = anchor + Duration::minutes(*offset);
            let mut fixture = Fixture::new(
                format!("R{round:02}-{:03}", slot + 1),
                round,
                kickoff.to_rfc3339_opts(SecondsFormat::Secs, false),
                venue,
                home,
                away,
            );

            // Last game of the previous round is still waiting on its result.
            let pending = round == CURRENT_ROUND - 1 && slot == SLOT_OFFSETS_MIN.len() - 1;
            if round < CURRENT_ROUND && !pending {
                fixture.home_score = Some(rng.gen_range(0..=40));
                fixture.away_score = Some(rng.gen_range(0..=40));
                fixture.is_final = Some(true);
                fixture.hash_id = Some(format!("{:06x}", rng.gen_range(0..0x100_0000u32)));
            }
            out.push(fixture);
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;
    use crate::policy::DurationPolicy;
    use crate::status::{MatchState, evaluate_all};
    use crate::timing::parse_kickoff;

    #[test]
    fn season_covers_every_state() {
        let now = parse_kickoff("2025-05-10T19:35:00+10:00").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let season = demo_season(now, &mut rng);
        assert_eq!(season.len(), (ROUNDS as usize) * SLOT_OFFSETS_MIN.len());

        let states: HashSet<MatchState> = evaluate_all(&DurationPolicy::default(), &season, now)
            .into_iter()
            .map(|s| s.unwrap().state)
            .collect();
        assert!(states.contains(&MatchState::Final));
        assert!(states.contains(&MatchState::AwaitingFinal));
        assert!(states.contains(&MatchState::Live));
        assert!(states.contains(&MatchState::Upcoming));
    }

    #[test]
    fn ids_are_unique_and_teams_differ() {
        let now = parse_kickoff("2025-05-10T19:35:00+10:00").unwrap();
        let mut rng = StdRng::seed_from_u64(11);
        let season = demo_season(now, &mut rng);
        let ids: HashSet<&str> = season.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids.len(), season.len());
        assert!(season.iter().all(|f| f.home != f.away));
        assert!(season.iter().all(|f| f.kickoff.ends_with("+10:00")));
    }
}
