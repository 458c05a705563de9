use std::collections::BTreeMap;

use stanza::style::{HAlign, Header, MinWidth, Separator, Styles};
use stanza::table::{Col, Row, Table};

use crate::calibration::CalibrationReport;
use crate::player::PlayerId;
use crate::recommend::{PairView, Recommendation, RoundView};

pub type Directory = BTreeMap<PlayerId, String>;

fn name<'a>(directory: &'a Directory, player: &'a PlayerId) -> &'a str {
    directory.get(player).map(String::as_str).unwrap_or(player.as_str())
}

fn pair_names(directory: &Directory, pair: &PairView) -> String {
    format!(
        "{} / {}",
        name(directory, &pair.player_a_id),
        name(directory, &pair.player_b_id)
    )
}

pub fn tabulate_recommendations(recommendations: &[Recommendation], directory: &Directory) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(18)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(30)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(8)).with(HAlign::Centred)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec![
                "Rank".into(),
                "Pairing".into(),
                "Pairs".into(),
                "Expected".into(),
                "Floor".into(),
                "Win prob".into(),
                "Volatility".into(),
                "Overall".into(),
                "Game".into(),
                "Matchup".into(),
            ],
        ));

    for recommendation in recommendations {
        let pairs = recommendation
            .pairs
            .iter()
            .map(|pair| pair_names(directory, pair))
            .collect::<Vec<_>>()
            .join(", ");
        table.push_row(Row::new(
            Styles::default().with(Separator(true)),
            vec![
                format!("{}", recommendation.rank).into(),
                recommendation.pairing_id.clone().into(),
                pairs.into(),
                format!("{:.3}", recommendation.expected_wins).into(),
                format!("{:.3}", recommendation.floor_wins).into(),
                format!("{:.3}", recommendation.matchup_win_probability).into(),
                format!("{:.3}", recommendation.volatility).into(),
                recommendation.confidence.overall.to_string().into(),
                recommendation.confidence.game.to_string().into(),
                recommendation.confidence.matchup.to_string().into(),
            ],
        ));
    }
    table
}

pub fn tabulate_schedule(rounds: &[RoundView], directory: &Directory) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(6)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(5)).with(HAlign::Centred)),
            Col::new(Styles::default().with(MinWidth(7)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(24)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(24)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec![
                "Round".into(),
                "Slot".into(),
                "Type".into(),
                "Our pair".into(),
                "Opponent".into(),
                "Win prob".into(),
            ],
        ));

    for round in rounds {
        for (index, slot) in round.slots.iter().enumerate() {
            let last = index + 1 == round.slots.len();
            let round_label = if index == 0 { round.round.to_string() } else { String::new() };
            let ours = slot
                .our_pair
                .as_ref()
                .map(|pair| pair_names(directory, pair))
                .unwrap_or_else(|| "forfeit".into());
            let opponent = slot
                .opponent_pair
                .as_ref()
                .map(|pair| pair_names(directory, pair))
                .unwrap_or_else(|| "-".into());
            table.push_row(Row::new(
                Styles::default().with(Separator(last)),
                vec![
                    round_label.into(),
                    format!("{}", slot.slot).into(),
                    slot.match_type.to_string().into(),
                    ours.into(),
                    opponent.into(),
                    format!("{:.3}", slot.win_probability).into(),
                ],
            ));
        }
    }
    table
}

pub fn tabulate_calibration(report: &CalibrationReport) -> Table {
    let mut table = Table::default()
        .with_cols(vec![
            Col::new(Styles::default().with(MinWidth(10)).with(HAlign::Left)),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
            Col::new(Styles::default().with(MinWidth(12)).with(HAlign::Right)),
        ])
        .with_row(Row::new(
            Styles::default().with(Header(true)).with(Separator(true)),
            vec!["Estimate".into(), "Brier".into(), "Log-loss".into()],
        ));
    for (label, metrics) in [("Base", &report.base), ("Blended", &report.blended)] {
        table.push_row(Row::new(
            Styles::default(),
            vec![
                label.into(),
                format!("{:.6}", metrics.brier_score).into(),
                format!("{:.6}", metrics.log_loss).into(),
            ],
        ));
    }
    table
}
