use std::{
    fs::{File, OpenOptions},
    io::{self, Read, Seek, SeekFrom, Write},
};

use crate::host::{
    HostCapability, HostError, PollFd,
    open_flags::{O_ACCMODE, O_APPEND, O_CREAT, O_RDWR, O_TRUNC, O_WRONLY},
    poll_events::{POLLIN, POLLNVAL, POLLOUT},
};

enum HostFile {
    Stdin,
    Stdout,
    Stderr,
    File(File),
}

/// Host bridge backed by the process' own standard streams and file system.
///
/// fds 0, 1 and 2 start out as stdin, stdout and stderr. Newly opened files take the
/// lowest free fd from 3 up.
pub struct StdHost {
    files: Vec<Option<HostFile>>,
}

impl Default for StdHost {
    fn default() -> Self {
        Self::new()
    }
}

const FIRST_FILE_FD: usize = 3;

impl StdHost {
    pub fn new() -> Self {
        Self {
            files: vec![
                Some(HostFile::Stdin),
                Some(HostFile::Stdout),
                Some(HostFile::Stderr),
            ],
        }
    }

    fn get(&mut self, fd: i32) -> Result<&mut HostFile, HostError> {
        usize::try_from(fd)
            .ok()
            .and_then(|idx| self.files.get_mut(idx))
            .and_then(Option::as_mut)
            .ok_or(HostError::BadFd(fd))
    }

    fn insert(&mut self, file: HostFile) -> i32 {
        let free = self
            .files
            .iter()
            .skip(FIRST_FILE_FD)
            .position(Option::is_none)
            .map(|pos| pos + FIRST_FILE_FD);

        let idx = match free {
            Some(idx) => {
                self.files[idx] = Some(file);
                idx
            }
            None => {
                self.files.push(Some(file));
                self.files.len() - 1
            }
        };
        idx as i32
    }
}

fn open_options(flags: u32, _mode: u32) -> OpenOptions {
    let mut options = OpenOptions::new();
    match flags & O_ACCMODE {
        O_WRONLY => options.write(true),
        O_RDWR => options.read(true).write(true),
        _ => options.read(true),
    };
    if flags & O_APPEND != 0 {
        options.append(true);
    }
    if flags & O_TRUNC != 0 {
        options.truncate(true);
    }
    if flags & O_CREAT != 0 {
        options.create(true);
    }

    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(_mode);
    }
    options
}

impl HostCapability for StdHost {
    fn open(&mut self, path: &[u8], flags: u32, mode: u32) -> Result<i32, HostError> {
        // Guests usually pass the terminating NUL along with the path.
        let path = path.split(|&ch| ch == 0).next().unwrap_or_default();
        let path = std::str::from_utf8(path).map_err(|_| HostError::InvalidArgument)?;
        if path.is_empty() {
            return Err(HostError::InvalidArgument);
        }

        let file = open_options(flags, mode).open(path)?;
        let fd = self.insert(HostFile::File(file));
        log::debug!("host opened {:?} as fd {}", path, fd);
        Ok(fd)
    }

    fn close(&mut self, fd: i32) -> Result<(), HostError> {
        self.get(fd)?;
        self.files[fd as usize] = None;
        Ok(())
    }

    fn read(&mut self, fd: i32, buf: &mut [u8]) -> Result<usize, HostError> {
        match self.get(fd)? {
            HostFile::Stdin => Ok(io::stdin().read(buf)?),
            HostFile::File(file) => Ok(file.read(buf)?),
            HostFile::Stdout | HostFile::Stderr => Err(HostError::BadFd(fd)),
        }
    }

    fn write(&mut self, fd: i32, buf: &[u8]) -> Result<usize, HostError> {
        match self.get(fd)? {
            HostFile::Stdout => {
                let mut stdout = io::stdout();
                let n = stdout.write(buf)?;
                stdout.flush()?;
                Ok(n)
            }
            HostFile::Stderr => Ok(io::stderr().write(buf)?),
            HostFile::File(file) => Ok(file.write(buf)?),
            HostFile::Stdin => Err(HostError::BadFd(fd)),
        }
    }

    fn seek(
        &mut self,
        fd: i32,
        offset: i32,
        whence: u32,
        max_offset: u64,
    ) -> Result<u64, HostError> {
        let HostFile::File(file) = self.get(fd)? else {
            return Err(HostError::InvalidArgument);
        };
        let base = match whence {
            0 => 0,
            1 => file.stream_position()?,
            2 => file.metadata()?.len(),
            _ => return Err(HostError::InvalidArgument),
        };

        let target = base
            .checked_add_signed(offset as i64)
            .filter(|&target| target <= max_offset)
            .ok_or(HostError::InvalidArgument)?;
        Ok(file.seek(SeekFrom::Start(target))?)
    }

    fn poll(&mut self, fds: &mut [PollFd], _timeout: i32) -> Result<usize, HostError> {
        for entry in fds.iter_mut() {
            entry.revents = match self.get(entry.fd) {
                Ok(_) => entry.events & (POLLIN | POLLOUT),
                // Negative fds are skipped, as poll(2) does.
                Err(_) if entry.fd < 0 => 0,
                Err(_) => POLLNVAL,
            };
        }
        Ok(fds.iter().filter(|entry| entry.revents != 0).count())
    }
}
