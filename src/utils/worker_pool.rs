// Copyright 2016-2019 Johannes Köster, David Lähnemann.
// Licensed under the GNU GPLv3 license (https://opensource.org/licenses/GPL-3.0)
// This file may not be copied, modified, or distributed
// except according to those terms.

use std::collections::BTreeMap;

use anyhow::{anyhow, Result};
use crossbeam::channel::{bounded, Receiver, Sender};
use crossbeam::thread::scope;

/// Create and execute a worker pool.
///
/// The preprocessor feeds work items into a bounded queue, consumed by the workers. Results
/// are passed through a second bounded queue to the postprocessor, which receives them in the
/// order given by `Orderable::index`, starting at zero.
/// Each stage ends when its input queue is drained and all upstream senders are dropped, so a
/// failing stage stops the whole pool. The first error (postprocessor, workers, preprocessor)
/// is returned.
/// # Arguments
/// * `workers` - Closures that execute the work.
pub(crate) fn worker_pool<Post, Pre, Workers, W, U, T>(
    preprocessor: Pre,
    workers: Workers,
    mut postprocessor: Post,
    in_capacity: usize,
    out_capacity: usize,
) -> Result<()>
where
    Post: FnMut(Box<T>) -> Result<()>,
    Post: Send,
    Pre: FnOnce(Sender<U>) -> Result<()>,
    Pre: Send,
    Workers: Iterator<Item = W>,
    W: FnOnce(Receiver<U>, Sender<Box<T>>) -> Result<()>,
    W: Send,
    T: Send + Orderable,
    U: Send,
{
    scope(|scope| -> Result<()> {
        let (in_sender, in_receiver) = bounded(in_capacity);
        let (out_sender, out_receiver) = bounded(out_capacity);

        let preprocessor = scope.spawn(move |_| preprocessor(in_sender));

        let workers: Vec<_> = workers
            .map(|worker: W| {
                let in_receiver = in_receiver.clone();
                let out_sender = out_sender.clone();
                scope.spawn(move |_| worker(in_receiver, out_sender))
            })
            .collect();
        // only the workers hold the queue ends now
        drop(in_receiver);
        drop(out_sender);

        let postprocessor = scope.spawn(move |_| -> Result<()> {
            let mut items = OrderedContainer::new();
            let mut next_index = 0;

            for item in out_receiver {
                items.insert(item.index(), item);

                // Find continuous prefix, postprocess in order.
                for item in items.remove_continuous_prefix(&mut next_index) {
                    postprocessor(item)?;
                }
            }

            Ok(())
        });

        let mut errors = Vec::new();
        let mut collect = |ret: std::thread::Result<Result<()>>, stage: &str| match ret {
            Ok(Ok(())) => (),
            Ok(Err(e)) => errors.push(e),
            Err(_) => errors.push(anyhow!("{} thread panicked", stage)),
        };

        collect(postprocessor.join(), "postprocessor");
        for worker in workers {
            collect(worker.join(), "worker");
        }
        collect(preprocessor.join(), "preprocessor");

        match errors.into_iter().next() {
            Some(e) => Err(e),
            None => Ok(()),
        }
    })
    .map_err(|_| anyhow!("worker pool panicked"))?
}

pub(crate) trait Orderable {
    fn index(&self) -> usize;
}

struct OrderedContainer<T> {
    inner: BTreeMap<usize, Box<T>>,
}

impl<T> OrderedContainer<T>
where
    T: Orderable,
{
    fn new() -> Self {
        OrderedContainer {
            inner: BTreeMap::new(),
        }
    }

    fn insert(&mut self, key: usize, value: Box<T>) {
        self.inner.insert(key, value);
    }

    /// Remove all items continuing the sequence at `next_index`, and advance it.
    fn remove_continuous_prefix(&mut self, next_index: &mut usize) -> Vec<Box<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.inner.remove(next_index) {
            items.push(item);
            *next_index += 1;
        }
        items
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Item(usize);

    impl Orderable for Item {
        fn index(&self) -> usize {
            self.0
        }
    }

    #[test]
    fn test_ordered_output() {
        let mut out = Vec::new();
        worker_pool(
            |sender| {
                for i in 0..20 {
                    sender.send(i)?;
                }
                Ok(())
            },
            (0..4).map(|_| {
                |receiver: Receiver<usize>, sender: Sender<Box<Item>>| -> Result<()> {
                    for i in receiver {
                        // finish in scrambled order
                        std::thread::sleep(std::time::Duration::from_millis(((20 - i) % 3) as u64));
                        sender.send(Box::new(Item(i)))?;
                    }
                    Ok(())
                }
            }),
            |item: Box<Item>| {
                out.push(item.0);
                Ok(())
            },
            2,
            2,
        )
        .unwrap();
        assert_eq!(out, (0..20).collect::<Vec<_>>());
    }

    #[test]
    fn test_worker_error_is_returned() {
        let result = worker_pool(
            |sender| {
                for i in 0..5 {
                    if sender.send(i).is_err() {
                        break;
                    }
                }
                Ok(())
            },
            (0..2).map(|_| {
                |receiver: Receiver<usize>, _sender: Sender<Box<Item>>| -> Result<()> {
                    for _ in receiver {
                        return Err(anyhow!("failed"));
                    }
                    Ok(())
                }
            }),
            |_: Box<Item>| Ok(()),
            1,
            1,
        );
        assert_eq!(result.unwrap_err().to_string(), "failed");
    }
}
