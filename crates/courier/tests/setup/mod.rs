use std::time::Duration;

use courier::{
    session::{
        session::{Session, SessionUpdate},
        session_config::SessionConfig,
    },
    solver::engine::{Algorithm, RoutingEngine},
};
use jiff::SignedDuration;
use tokio::time::timeout;

pub const PLANAR_VRP: &str = r#"
NAME : P-n7-k2
TYPE : CVRP
DIMENSION : 7
EDGE_WEIGHT_TYPE : EUC_2D
CAPACITY : 30
NODE_COORD_SECTION
 1 0 0
 2 10 0
 3 20 0
 4 20 10
 5 0 10
 6 -10 10
 7 -10 0
DEMAND_SECTION
1 0
2 10
3 10
4 10
5 10
6 10
7 10
DEPOT_SECTION
 1
 -1
EOF
"#;

pub const ROAD_VRP: &str = r#"
NAME: flanders-n4-k2
TYPE: CVRP
DIMENSION: 4
EDGE_WEIGHT_TYPE: EXPLICIT
EDGE_WEIGHT_FORMAT: FULL_MATRIX
CAPACITY: 50
NODE_COORD_SECTION
1 50.8503 4.3517 BRUSSELS
2 51.2194 4.4025 ANTWERPEN
3 51.0543 3.7174 GENT
4 50.8798 4.7005 LEUVEN
EDGE_WEIGHT_SECTION
0.0 45.5 56.1 26.0
46.0 0.0 60.2 48.3
55.9 59.8 0.0 80.4
25.7 48.0 80.9 0.0
DEMAND_SECTION
1 0
2 30
3 20
4 25
DEPOT_SECTION
1
-1
EOF
"#;

pub fn config(seconds: i64, algorithm: Algorithm) -> SessionConfig {
    SessionConfig {
        time_limit: SignedDuration::from_secs(seconds),
        algorithm,
        ..SessionConfig::default()
    }
}

/// Applies events until the run finishes and returns every update seen.
pub async fn run_until_finished<E: RoutingEngine>(session: &mut Session<E>) -> Vec<SessionUpdate> {
    let mut updates = Vec::new();
    loop {
        let event = timeout(Duration::from_secs(10), session.next_event())
            .await
            .expect("run did not finish in time")
            .expect("event channel closed");

        if let Some(update) = session.apply(event) {
            let finished = matches!(update, SessionUpdate::RunFinished { .. });
            updates.push(update);
            if finished {
                return updates;
            }
        }
    }
}
