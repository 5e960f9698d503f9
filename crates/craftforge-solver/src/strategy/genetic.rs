//! Genetic search over fixed-length chromosomes.
//!
//! A chromosome is a fixed-length gene vector; gene `g < K` names the
//! `g`-th allowed action and gene `K` is a stop gene that ends the
//! sequence. Chromosomes are normalised to their legal prefix, so every
//! evaluated individual is a sequence the simulator accepts.

use std::cmp::Ordering;

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use craftforge_config::GeneticConfig;
use craftforge_core::{simulate_to_failure, ActionId, CraftContext, CraftState};
use craftforge_scoring::{AuditChain, AuditStats, ScoreWeights, Scorer};

use super::Strategy;
use crate::error::SolveResult;
use crate::scope::SearchScope;

/// Streams reserved per generation for shard generators.
const STREAMS_PER_GENERATION: u64 = 1 << 16;

#[derive(Debug, Clone)]
struct Individual {
    genes: Vec<u8>,
    sequence: Vec<ActionId>,
    state: CraftState,
    fitness: f64,
}

/// Population search with elitism and uniform gene-wise crossover.
#[derive(Debug, Clone)]
pub struct GeneticSearch {
    config: GeneticConfig,
    weights: ScoreWeights,
}

impl GeneticSearch {
    pub fn new(config: GeneticConfig) -> Self {
        Self {
            config,
            weights: ScoreWeights::genetic(),
        }
    }

    pub fn with_weights(mut self, weights: ScoreWeights) -> Self {
        self.weights = weights;
        self
    }

    pub fn config(&self) -> &GeneticConfig {
        &self.config
    }

    fn elite_count(&self) -> usize {
        ((self.config.elite_fraction * self.config.population_size as f64).ceil() as usize)
            .clamp(1, self.config.population_size)
    }

    fn mating_count(&self) -> usize {
        ((self.config.mating_fraction * self.config.population_size as f64).ceil() as usize)
            .clamp(2, self.config.population_size.max(2))
    }
}

impl Default for GeneticSearch {
    fn default() -> Self {
        Self::new(GeneticConfig::default())
    }
}

/// Everything a shard needs to turn genes into individuals.
struct Evaluator<'a> {
    ctx: &'a CraftContext,
    allowed: &'a [ActionId],
    scorer: Scorer,
    chain: &'a AuditChain,
    stats: &'a AuditStats,
}

impl Evaluator<'_> {
    fn stop_gene(&self) -> u8 {
        self.allowed.len() as u8
    }

    /// Decodes, normalises and scores a chromosome.
    ///
    /// Returns the individual and the number of simulations spent, or
    /// `None` for an empty or rejected sequence.
    fn evaluate(&self, mut genes: Vec<u8>) -> (Option<Individual>, u64) {
        let stop = self.stop_gene();
        let mut sequence: Vec<ActionId> = genes
            .iter()
            .take_while(|&&g| g < stop)
            .map(|&g| self.allowed[g as usize])
            .collect();

        let outcome = simulate_to_failure(self.ctx, &sequence);
        let simulated = (outcome.applied + usize::from(outcome.failure.is_some())) as u64;
        sequence.truncate(outcome.applied);
        for gene in genes.iter_mut().skip(outcome.applied) {
            *gene = stop;
        }

        if sequence.is_empty() || !self.chain.passes(&sequence, self.ctx, self.stats) {
            return (None, simulated);
        }
        let fitness = self.scorer.score_partial(&outcome.state);
        let individual = Individual {
            genes,
            sequence,
            state: outcome.state,
            fitness,
        };
        (Some(individual), simulated)
    }
}

fn random_genes(rng: &mut ChaCha8Rng, length: usize, stop: u8) -> Vec<u8> {
    (0..length).map(|_| rng.random_range(0..=stop)).collect()
}

fn crossover(
    rng: &mut ChaCha8Rng,
    a: &Individual,
    b: &Individual,
    config: &GeneticConfig,
    stop: u8,
) -> Vec<u8> {
    a.genes
        .iter()
        .zip(&b.genes)
        .map(|(&ga, &gb)| {
            let roll: f64 = rng.random();
            if roll < config.parent_a_rate {
                ga
            } else if roll < config.parent_a_rate + config.parent_b_rate {
                gb
            } else {
                rng.random_range(0..=stop)
            }
        })
        .collect()
}

fn by_fitness(a: &Individual, b: &Individual) -> Ordering {
    b.fitness
        .partial_cmp(&a.fitness)
        .unwrap_or(Ordering::Equal)
        .then_with(|| a.sequence.len().cmp(&b.sequence.len()))
}

impl Strategy for GeneticSearch {
    fn name(&self) -> &'static str {
        "Genetic"
    }

    fn solve(&mut self, scope: &SearchScope<'_>) -> SolveResult<()> {
        let ctx = scope.ctx();
        let allowed = ctx.allowed();
        if allowed.is_empty() || self.config.population_size == 0 || self.config.max_length == 0 {
            return Ok(());
        }

        let chain = AuditChain::genetic();
        let evaluator = Evaluator {
            ctx,
            allowed,
            scorer: Scorer::new(ctx, self.weights),
            chain: &chain,
            stats: scope.audit_stats(),
        };
        let stop = evaluator.stop_gene();
        let shard_size = self.config.shard_size.max(1);
        let elites = self.elite_count();
        let mating = self.mating_count();

        let mut population: Vec<Individual> = Vec::new();
        let mut best_fitness = f64::NEG_INFINITY;
        let mut stagnant = 0usize;

        for generation in 0..self.config.generations {
            if scope.should_terminate() {
                break;
            }

            let carried = if population.is_empty() { 0 } else { elites.min(population.len()) };
            let wanted = self.config.population_size - carried;
            let shards: Vec<(u64, usize)> = (0..wanted)
                .step_by(shard_size)
                .enumerate()
                .map(|(i, start)| (i as u64, shard_size.min(wanted - start)))
                .collect();

            let parents = &population[..mating.min(population.len())];
            let config = &self.config;
            let evaluator = &evaluator;
            let results = scope.pool().map(shards, |(shard, count)| {
                let stream = generation as u64 * STREAMS_PER_GENERATION + shard;
                let mut rng = scope.rng(stream);
                let mut children = Vec::with_capacity(count);
                let mut simulated = 0u64;
                for _ in 0..count {
                    let genes = if parents.len() < 2 {
                        random_genes(&mut rng, config.max_length, stop)
                    } else {
                        let a = &parents[rng.random_range(0..parents.len())];
                        let b = &parents[rng.random_range(0..parents.len())];
                        crossover(&mut rng, a, b, config, stop)
                    };
                    let (child, spent) = evaluator.evaluate(genes);
                    simulated += spent;
                    children.extend(child);
                }
                scope.statistics().record_simulated(simulated);
                children
            });

            population.truncate(carried);
            population.extend(results.into_iter().flatten());
            population.sort_by(by_fitness);
            scope.statistics().record_expanded();

            let Some(leader) = population.first() else {
                debug!(event = "generation", generation = generation, population = 0usize);
                continue;
            };
            if let Some(best_complete) = population.iter().find(|i| ctx.is_complete(&i.state)) {
                let score = evaluator.scorer.score_complete(&best_complete.state);
                scope.offer(&best_complete.sequence, &best_complete.state, score);
            }

            if leader.fitness - best_fitness < self.config.improvement_epsilon {
                stagnant += 1;
            } else {
                stagnant = 0;
            }
            best_fitness = best_fitness.max(leader.fitness);

            debug!(
                event = "generation",
                generation = generation,
                population = population.len(),
                best = leader.fitness,
                length = leader.sequence.len(),
                stagnant = stagnant,
            );
            scope.log_with(|| {
                format!(
                    "generation {generation}: best fitness {:.4} over {} individuals",
                    leader.fitness,
                    population.len()
                )
            });

            if self.config.stagnation_generations > 0 && stagnant >= self.config.stagnation_generations {
                break;
            }
        }
        Ok(())
    }
}
