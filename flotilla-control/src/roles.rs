use tracing::info;

use crate::errors::{ControlError, Result};
use crate::rpc::WorkerEndpoint;

/// Producer/consumer split of the fleet. Computed once at construction and
/// immutable for the lifetime of the ensemble; only group membership is
/// meaningful, intra-group order carries no semantics.
#[derive(Debug, Clone)]
pub struct RoleGroups {
    pub producers: Vec<WorkerEndpoint>,
    pub consumers: Vec<WorkerEndpoint>,
}

impl RoleGroups {
    /// Splits the fleet in configuration order: the first `producer_count`
    /// workers publish, the remainder consume.
    ///
    /// `extra_consumers` shifts the split to roughly one producer per two
    /// consumers, for backends that need an extra listener-style worker per
    /// producer.
    pub fn assign(fleet: &[WorkerEndpoint], extra_consumers: bool) -> Result<RoleGroups> {
        if fleet.len() < 2 {
            return Err(ControlError::Configuration(format!(
                "at least 2 workers are required to fill both producer and consumer roles, got {}",
                fleet.len()
            )));
        }

        let producer_count = if extra_consumers {
            (fleet.len() + 2) / 3
        } else {
            fleet.len() / 2
        };

        let producers = fleet[..producer_count].to_vec();
        let consumers = fleet[producer_count..].to_vec();

        info!("Workers list - producers: {:?}", producers);
        info!("Workers list - consumers: {:?}", consumers);

        Ok(RoleGroups {
            producers,
            consumers,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fleet(size: usize) -> Vec<WorkerEndpoint> {
        (0..size)
            .map(|i| WorkerEndpoint::new(format!("http://worker-{i}:8080")))
            .collect()
    }

    #[test]
    fn both_groups_cover_the_fleet_and_are_non_empty() {
        for size in 2..=16 {
            for extra_consumers in [false, true] {
                let workers = fleet(size);
                let groups = RoleGroups::assign(&workers, extra_consumers).expect("assign");

                assert_eq!(
                    groups.producers.len() + groups.consumers.len(),
                    size,
                    "size {size} extra_consumers {extra_consumers}"
                );
                assert!(!groups.producers.is_empty());
                assert!(!groups.consumers.is_empty());
            }
        }
    }

    #[test]
    fn membership_follows_configuration_order() {
        let workers = fleet(5);
        let groups = RoleGroups::assign(&workers, false).expect("assign");

        assert_eq!(groups.producers, workers[..2].to_vec());
        assert_eq!(groups.consumers, workers[2..].to_vec());
    }

    #[test]
    fn even_split_without_extra_consumers() {
        let groups = RoleGroups::assign(&fleet(9), false).expect("assign");
        assert_eq!(groups.producers.len(), 4);
        assert_eq!(groups.consumers.len(), 5);
    }

    #[test]
    fn extra_consumers_shifts_towards_one_third_producers() {
        let groups = RoleGroups::assign(&fleet(10), true).expect("assign");
        assert_eq!(groups.producers.len(), 4);
        assert_eq!(groups.consumers.len(), 6);
    }

    #[test]
    fn single_worker_fleet_is_rejected() {
        let result = RoleGroups::assign(&fleet(1), false);
        assert!(matches!(result, Err(ControlError::Configuration(_))));
    }
}
