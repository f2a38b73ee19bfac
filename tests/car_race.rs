mod common;

use std::time::Duration;

use common::{quick_timings, quoted_word, Harness};

async fn start_accepted_race(h: &mut Harness) {
    let (alice, bob) = (h.alice.clone(), h.bob.clone());
    h.post(&alice, "--car-race <@2> ae86");
    h.wait_for("<@2>, do you accept this challenge?").await;
    h.post(&bob, "yes");
    h.wait_for("<@2>, what car do you want to be?").await;
}

#[actix_rt::test]
async fn fastest_typist_wins_after_seven_rounds() {
    let mut h = Harness::new(quick_timings());
    let (alice, bob) = (h.alice.clone(), h.bob.clone());
    start_accepted_race(&mut h).await;
    h.post(&bob, "anakin");

    let welcome = h.wait_for("Get Ready...").await;
    assert!(welcome.content.unwrap().starts_with("Welcome to `car-race`!"));
    assert!(welcome.attachment.is_some());

    for _ in 0..7 {
        let prompt = h.wait_for("NOW!").await;
        let word = quoted_word(&prompt.content.unwrap());
        assert!(channel_games_bot::game::car_race::WORDS.contains(&word.as_str()));
        h.post(&alice, &word);
    }

    let finish = h.wait_for("Congrats, <@1>!").await;
    assert!(finish.attachment.unwrap().url.starts_with("/frames/"));
    h.wait_until_idle().await;
}

#[actix_rt::test]
async fn wrong_words_and_spectators_do_not_score() {
    let mut h = Harness::new(quick_timings());
    let (bob, carol) = (h.bob.clone(), h.carol.clone());
    start_accepted_race(&mut h).await;
    h.post(&bob, "anakin");

    let prompt = h.wait_for("NOW!").await;
    let word = quoted_word(&prompt.content.unwrap());
    h.post(&carol, &word);
    h.post(&bob, "definitely-not-the-word");
    h.post(&bob, &word.to_uppercase());

    h.wait_for("<@2> pulls ahead!").await;
    h.post(&bob, "end");
    h.wait_for("Congrats, <@1>!").await;
}

#[actix_rt::test]
async fn two_silent_rounds_end_the_race() {
    let mut timings = quick_timings();
    timings.race_round_timeout = Duration::from_millis(100);
    let mut h = Harness::new(timings);
    let bob = h.bob.clone();
    start_accepted_race(&mut h).await;
    h.post(&bob, "anakin");

    h.wait_for("Come on, get your head in the game!").await;
    h.wait_for("Game ended due to inactivity.").await;
    h.wait_until_idle().await;
}

#[actix_rt::test]
async fn ending_before_the_word_forfeits() {
    let mut timings = quick_timings();
    timings.race_early_end_min = Duration::from_secs(3);
    timings.race_early_end_max = Duration::from_secs(3);
    let mut h = Harness::new(timings);
    let bob = h.bob.clone();
    start_accepted_race(&mut h).await;
    h.post(&bob, "anakin");

    h.wait_for("Get Ready...").await;
    h.post(&bob, "END");
    h.wait_for("Congrats, <@1>!").await;
    h.wait_until_idle().await;
}

#[actix_rt::test]
async fn silent_opponent_gets_a_random_car() {
    let mut timings = quick_timings();
    timings.car_choice_timeout = Duration::from_millis(50);
    let mut h = Harness::new(timings);
    let alice = h.alice.clone();
    start_accepted_race(&mut h).await;

    h.wait_for("NOW!").await;
    h.post(&alice, "end");
    h.wait_for("Congrats, <@2>!").await;
}

#[actix_rt::test]
async fn declined_challenge_frees_the_channel() {
    let mut h = Harness::new(quick_timings());
    let (alice, bob, carol) = (h.alice.clone(), h.bob.clone(), h.carol.clone());
    h.post(&alice, "--car-race <@2> ae86");
    h.wait_for("do you accept this challenge?").await;

    h.post(&carol, "--chess <@1>");
    h.wait_for("<@3>, Please wait until the current game of `car-race` is finished.").await;

    h.post(&bob, "nope");
    h.wait_for("Looks like they declined...").await;
    h.wait_until_idle().await;
    assert!(h.app.registry.current("general").is_none());
}

#[actix_rt::test]
async fn bad_arguments_are_explained() {
    let mut h = Harness::new(quick_timings());
    let alice = h.alice.clone();

    h.post(&alice, "--car-race");
    h.wait_for("What user would you like to challenge?").await;
    h.post(&alice, "--cars <@2> tesla");
    h.wait_for("What car do you want to use? Either ae86").await;
    h.post(&alice, "--car-race <@xiao> ae86");
    h.wait_for("Bots may not be played against.").await;
    h.post(&alice, "--car-race <@1> ae86");
    h.wait_for("You may not play against yourself.").await;
    assert!(h.app.registry.is_empty());
}
